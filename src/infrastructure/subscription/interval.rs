use std::{cell::RefCell, rc::Rc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::{
    core::{dispatch::Dispatch, sub::Watch},
    Result,
};

/// Timer subscription that emits a message every `period`
///
/// Every attach starts a fresh timer on the current `LocalSet`; detach aborts
/// it. Because the runtime rewires subscriptions after each message, the
/// timer restarts whenever any message is processed.
pub struct Every<Msg> {
    period: Duration,
    make: Rc<dyn Fn() -> Msg>,
    tasks: RefCell<Vec<(Dispatch<Msg>, JoinHandle<()>)>>,
}

impl<Msg: 'static> Every<Msg> {
    pub fn new(period: Duration, make: impl Fn() -> Msg + 'static) -> Self {
        Self {
            period,
            make: Rc::new(make),
            tasks: RefCell::new(Vec::new()),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of timers currently running
    pub fn active(&self) -> usize {
        self.tasks
            .borrow()
            .iter()
            .filter(|(_, task)| !task.is_finished())
            .count()
    }
}

impl<Msg: 'static> Watch<Msg> for Every<Msg> {
    /// # Panics
    ///
    /// Panics when called outside of a `tokio::task::LocalSet`.
    fn attach(&self, dispatch: &Dispatch<Msg>) -> Result<()> {
        let period = self.period;
        let make = Rc::clone(&self.make);
        let target = dispatch.clone();
        let task = tokio::task::spawn_local(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = target.dispatch(make()) {
                    tracing::error!("Timer dispatch failed, stopping timer: {e:?}");
                    break;
                }
            }
        });
        self.tasks.borrow_mut().push((dispatch.clone(), task));
        Ok(())
    }

    fn detach(&self, dispatch: &Dispatch<Msg>) {
        self.tasks.borrow_mut().retain(|(owner, task)| {
            if owner.ptr_eq(dispatch) {
                task.abort();
                false
            } else {
                true
            }
        });
    }
}

impl<Msg> Drop for Every<Msg> {
    fn drop(&mut self) {
        for (_, task) in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}
