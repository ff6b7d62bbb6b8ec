use crate::{
    core::{cmd::Cmd, dispatch::Dispatch},
    Result,
};

/// Pure transition `(Msg, &Model) -> (Model, Cmd)`
///
/// Implementations must not touch the runtime they belong to; side effects go
/// into the returned command.
pub trait Updater<M, Msg> {
    fn update(&self, msg: Msg, model: &M) -> Result<(M, Cmd<Msg>)>;
}

impl<M, Msg, F> Updater<M, Msg> for F
where
    F: Fn(Msg, &M) -> Result<(M, Cmd<Msg>)>,
{
    fn update(&self, msg: Msg, model: &M) -> Result<(M, Cmd<Msg>)> {
        self(msg, model)
    }
}

/// Output sink for the latest model
pub trait Renderer<M, Msg> {
    /// Called once at start-up with the handle user interaction should
    /// dispatch through
    fn init(&mut self, _dispatch: Dispatch<Msg>) -> Result<()> {
        Ok(())
    }

    /// Called with the first model and then whenever the model changes.
    /// Must not dispatch synchronously.
    fn render(&mut self, model: &M) -> Result<()>;
}

impl<M, Msg, F> Renderer<M, Msg> for F
where
    F: FnMut(&M) -> Result<()>,
{
    fn render(&mut self, model: &M) -> Result<()> {
        self(model)
    }
}
