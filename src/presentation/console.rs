use std::io::Write;

use crate::{
    app::{Counter, CounterMsg},
    core::{app::Renderer, dispatch::Dispatch},
    Result,
};

/// Writes one status line per rendered model
pub struct ConsoleRenderer<W> {
    out: W,
    max_ticks: u64,
    dispatch: Option<Dispatch<CounterMsg>>,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, max_ticks: u64) -> Self {
        Self {
            out,
            max_ticks,
            dispatch: None,
        }
    }

    /// Handle received from the runtime, available after `init`
    pub fn dispatcher(&self) -> Option<&Dispatch<CounterMsg>> {
        self.dispatch.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&self, model: &Counter) -> String {
        let progress = if self.max_ticks > 0 {
            format!("{}/{}", model.ticks, self.max_ticks)
        } else {
            model.ticks.to_string()
        };
        let state = if model.running { "running" } else { "stopped" };
        format!("count={} ticks={progress} {state}", model.count)
    }
}

impl<W: Write> Renderer<Counter, CounterMsg> for ConsoleRenderer<W> {
    fn init(&mut self, dispatch: Dispatch<CounterMsg>) -> Result<()> {
        self.dispatch = Some(dispatch);
        Ok(())
    }

    fn render(&mut self, model: &Counter) -> Result<()> {
        let line = self.line(model);
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}
