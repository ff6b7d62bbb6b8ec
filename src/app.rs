//! Counter application driven by a timer subscription
//!
//! Used by the `elmloop` binary; doubles as a compact reference for wiring
//! an update function, subscriptions and a renderer together.

use std::{rc::Rc, time::Duration};

use color_eyre::eyre::eyre;
use strum::Display;

use crate::{
    core::{app::Updater, cmd::Cmd, sub::Sub},
    infrastructure::{config::CounterConfig, subscription::Every},
    Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub count: i64,
    pub ticks: u64,
    pub running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CounterMsg {
    Tick,
    Increment,
    Decrement,
    Reset,
    Stop,
}

#[derive(Debug, Clone)]
pub struct CounterApp {
    config: CounterConfig,
}

impl CounterApp {
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn init(&self) -> (Counter, Cmd<CounterMsg>) {
        (
            Counter {
                count: 0,
                ticks: 0,
                running: true,
            },
            Cmd::none(),
        )
    }

    /// Tick while running; nothing once stopped
    pub fn subscriptions(&self, model: &Counter) -> Sub<CounterMsg> {
        if !model.running {
            return Sub::none();
        }
        let period = Duration::from_millis(self.config.tick_rate_ms);
        Sub::watch(Rc::new(Every::new(period, || CounterMsg::Tick)))
    }

    fn is_finished(&self, ticks: u64) -> bool {
        self.config.max_ticks > 0 && ticks >= self.config.max_ticks
    }
}

impl Updater<Counter, CounterMsg> for CounterApp {
    fn update(&self, msg: CounterMsg, model: &Counter) -> Result<(Counter, Cmd<CounterMsg>)> {
        if !model.running {
            return Ok((model.clone(), Cmd::none()));
        }

        let next = match msg {
            CounterMsg::Tick => {
                let ticks = model.ticks + 1;
                Counter {
                    count: shift(model.count, self.config.step)?,
                    ticks,
                    running: !self.is_finished(ticks),
                }
            }
            CounterMsg::Increment => Counter {
                count: shift(model.count, 1)?,
                ..model.clone()
            },
            CounterMsg::Decrement => Counter {
                count: shift(model.count, -1)?,
                ..model.clone()
            },
            CounterMsg::Reset => Counter {
                count: 0,
                ..model.clone()
            },
            CounterMsg::Stop => Counter {
                running: false,
                ..model.clone()
            },
        };
        Ok((next, Cmd::none()))
    }
}

fn shift(count: i64, by: i64) -> Result<i64> {
    count
        .checked_add(by)
        .ok_or_else(|| eyre!("Counter overflow: {count} + {by} is out of range"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;

    use super::*;

    fn app(max_ticks: u64) -> CounterApp {
        CounterApp::new(CounterConfig {
            tick_rate_ms: 10,
            max_ticks,
            step: 2,
        })
    }

    #[rstest]
    #[case(CounterMsg::Tick, 7, 1)]
    #[case(CounterMsg::Increment, 6, 0)]
    #[case(CounterMsg::Decrement, 4, 0)]
    #[case(CounterMsg::Reset, 0, 0)]
    fn test_update(#[case] msg: CounterMsg, #[case] count: i64, #[case] ticks: u64) {
        let model = Counter {
            count: 5,
            ticks: 0,
            running: true,
        };
        let (next, cmd) = app(0).update(msg, &model).unwrap();
        assert_eq!(next.count, count);
        assert_eq!(next.ticks, ticks);
        assert!(next.running);
        assert!(cmd.is_none());
    }

    #[rstest]
    #[case(CounterMsg::Tick, i64::MAX, 1)]
    #[case(CounterMsg::Tick, i64::MIN, -1)]
    #[case(CounterMsg::Increment, i64::MAX, 1)]
    #[case(CounterMsg::Decrement, i64::MIN, 1)]
    fn test_update_rejects_overflow(
        #[case] msg: CounterMsg,
        #[case] count: i64,
        #[case] step: i64,
    ) {
        let app = CounterApp::new(CounterConfig {
            tick_rate_ms: 10,
            max_ticks: 0,
            step,
        });
        let model = Counter {
            count,
            ticks: 0,
            running: true,
        };
        let err = app.update(msg, &model).unwrap_err();
        assert!(err.to_string().starts_with("Counter overflow"));
    }

    #[test]
    fn test_stops_after_max_ticks() {
        let app = app(2);
        let (model, _) = app.init();
        let (model, _) = app.update(CounterMsg::Tick, &model).unwrap();
        assert!(model.running);
        let (model, _) = app.update(CounterMsg::Tick, &model).unwrap();
        assert!(!model.running);
        assert_eq!(model.count, 4);
    }

    #[test]
    fn test_stopped_counter_ignores_messages() {
        let app = app(0);
        let stopped = Counter {
            count: 3,
            ticks: 1,
            running: false,
        };
        let (next, _) = app.update(CounterMsg::Increment, &stopped).unwrap();
        assert_eq!(next, stopped);
    }

    #[test]
    fn test_subscriptions_follow_running_flag() {
        let app = app(0);
        let (mut model, _) = app.init();
        assert!(!app.subscriptions(&model).is_none());
        model.running = false;
        assert!(app.subscriptions(&model).is_none());
    }

    #[test]
    fn test_msg_display() {
        assert_eq!(CounterMsg::Tick.to_string(), "Tick");
    }
}
