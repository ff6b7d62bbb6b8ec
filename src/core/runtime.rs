use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use color_eyre::eyre::eyre;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::{
    core::{
        app::{Renderer, Updater},
        cmd::Cmd,
        dispatch::Dispatch,
        sub::Sub,
    },
    Result,
};

/// Function recomputing the active subscription from the model
pub type SubscriptionFn<M, Msg> = Box<dyn Fn(&M) -> Sub<Msg>>;

/// Runtime statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeStats {
    pub dispatches: u64,
    pub renders: u64,
    pub suppressed_renders: u64,
    pub subscription_rewires: u64,
}

/// Single-threaded Elm update loop
///
/// Owns the model and serialises every message through
/// update → render (only on change) → command → subscription rewiring.
/// Messages produced synchronously while a message is being processed are
/// handled to completion before the outer message continues.
pub struct Runtime<M, Msg> {
    inner: Rc<Inner<M, Msg>>,
}

struct Inner<M, Msg> {
    updater: Box<dyn Updater<M, Msg>>,
    renderer: RefCell<Box<dyn Renderer<M, Msg>>>,
    subscription: SubscriptionFn<M, Msg>,
    model: RefCell<M>,
    // None until the first subscription has been attached
    current_sub: RefCell<Option<Sub<Msg>>>,
    stats: Cell<RuntimeStats>,
    dispatch: Dispatch<Msg>,
}

impl<M, Msg> Runtime<M, Msg>
where
    M: Clone + PartialEq + 'static,
    Msg: 'static,
{
    /// Create a runtime without subscriptions
    pub fn new(
        init: impl FnOnce() -> (M, Cmd<Msg>),
        updater: impl Updater<M, Msg> + 'static,
        renderer: impl Renderer<M, Msg> + 'static,
    ) -> Result<Self> {
        Self::with_subscription(init, updater, renderer, |_: &M| Sub::None)
    }

    /// Create a runtime and start the loop
    ///
    /// Runs the initial command, hands the dispatch handle to the renderer,
    /// renders the initial model and attaches the first subscription.
    pub fn with_subscription(
        init: impl FnOnce() -> (M, Cmd<Msg>),
        updater: impl Updater<M, Msg> + 'static,
        renderer: impl Renderer<M, Msg> + 'static,
        subscription: impl Fn(&M) -> Sub<Msg> + 'static,
    ) -> Result<Self> {
        let (model, cmd) = init();

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<M, Msg>>| {
            let weak = weak.clone();
            let dispatch = Dispatch::new(move |msg: Msg| match weak.upgrade() {
                Some(inner) => inner.dispatch(msg),
                None => {
                    warn!("Message dispatched after the runtime was dropped");
                    Ok(())
                }
            });
            Inner {
                updater: Box::new(updater),
                renderer: RefCell::new(Box::new(renderer)),
                subscription: Box::new(subscription),
                model: RefCell::new(model),
                current_sub: RefCell::new(None),
                stats: Cell::new(RuntimeStats::default()),
                dispatch,
            }
        });

        debug!("Starting runtime");
        cmd.execute(&inner.dispatch)?;
        inner
            .renderer
            .try_borrow_mut()
            .map_err(|_| eyre!("Renderer is busy during start-up"))?
            .init(inner.dispatch.clone())?;
        let model = inner.model.borrow().clone();
        inner.render(&model)?;
        inner.update_subscription()?;

        Ok(Self { inner })
    }

    /// Process one message; see [`Dispatch::dispatch`]
    pub fn dispatch(&self, msg: Msg) -> Result<()> {
        self.inner.dispatch(msg)
    }

    /// Handle that feeds messages into this runtime
    pub fn dispatcher(&self) -> Dispatch<Msg> {
        self.inner.dispatch.clone()
    }

    pub fn model(&self) -> M {
        self.inner.model.borrow().clone()
    }

    pub fn stats(&self) -> RuntimeStats {
        self.inner.stats.get()
    }
}

impl<M, Msg> Drop for Runtime<M, Msg> {
    fn drop(&mut self) {
        let current = self.inner.current_sub.borrow_mut().take();
        if let Some(sub) = current {
            sub.detach(&self.inner.dispatch);
        }
    }
}

impl<M, Msg> Inner<M, Msg>
where
    M: Clone + PartialEq + 'static,
    Msg: 'static,
{
    fn dispatch(&self, msg: Msg) -> Result<()> {
        self.bump(|stats| stats.dispatches += 1);

        let (model, cmd, changed) = {
            let current = self.model.borrow();
            let (model, cmd) = self.updater.update(msg, &current)?;
            let changed = model != *current;
            (model, cmd, changed)
        };

        if changed {
            // The stored model only advances once rendering succeeded.
            self.render(&model)?;
            *self
                .model
                .try_borrow_mut()
                .map_err(|_| eyre!("Updater dispatched a message while updating"))? = model;
        } else {
            trace!("Model unchanged, skipping render");
            self.bump(|stats| stats.suppressed_renders += 1);
        }

        cmd.execute(&self.dispatch)?;
        self.update_subscription()
    }

    fn render(&self, model: &M) -> Result<()> {
        let mut renderer = self
            .renderer
            .try_borrow_mut()
            .map_err(|_| eyre!("Renderer dispatched a model change while rendering"))?;
        renderer.render(model)?;
        self.bump(|stats| stats.renders += 1);
        Ok(())
    }

    /// Detach the previous subscription, then attach one computed from the
    /// current model. Runs after every message, changed or not.
    fn update_subscription(&self) -> Result<()> {
        let previous = self.current_sub.borrow_mut().take();
        if let Some(previous) = previous {
            previous.detach(&self.dispatch);
        }

        let next = {
            let model = self.model.borrow();
            (self.subscription)(&model)
        };
        if let Err(e) = next.attach(&self.dispatch) {
            // Unwind the sources of a batch that attached before the failure.
            next.detach(&self.dispatch);
            return Err(e);
        }
        self.bump(|stats| stats.subscription_rewires += 1);

        // A source firing during attach already rewired through a nested
        // dispatch; that subscription reflects the newer model.
        let mut current = self.current_sub.borrow_mut();
        if current.is_some() {
            drop(current);
            next.detach(&self.dispatch);
        } else {
            trace!("Subscription rewired: {next:?}");
            *current = Some(next);
        }
        Ok(())
    }

    fn bump(&self, f: impl FnOnce(&mut RuntimeStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}
