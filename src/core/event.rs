//! Explicit event hub
//!
//! Instead of process-wide static events, an [`Event`] is an ordinary value
//! that is shared by reference (usually through an `Rc`). Every subscriber
//! receives a [`HandlerId`] which it uses to deregister.

use std::cell::{Cell, RefCell};

use crate::{
    core::{dispatch::Dispatch, sub::Watch},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

pub struct Event<T> {
    handlers: RefCell<Vec<(HandlerId, Dispatch<T>)>>,
    next_id: Cell<u64>,
}

impl<T: Clone + 'static> Event<T> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(T) -> Result<()> + 'static) -> HandlerId {
        self.subscribe_dispatch(Dispatch::new(handler))
    }

    fn subscribe_dispatch(&self, dispatch: Dispatch<T>) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, dispatch));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Invoke every handler registered at the time of the call
    ///
    /// Handlers may subscribe or unsubscribe while the event is being raised;
    /// such changes take effect on the next raise. The first handler error
    /// aborts the raise and is returned.
    pub fn raise(&self, value: T) -> Result<()> {
        let snapshot: Vec<Dispatch<T>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, dispatch)| dispatch.clone())
            .collect();
        tracing::trace!("Raising event to {} handler(s)", snapshot.len());
        snapshot
            .iter()
            .try_for_each(|dispatch| dispatch.dispatch(value.clone()))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl<T: Clone + 'static> Default for Event<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Watch<T> for Event<T> {
    fn attach(&self, dispatch: &Dispatch<T>) -> Result<()> {
        self.subscribe_dispatch(dispatch.clone());
        Ok(())
    }

    fn detach(&self, dispatch: &Dispatch<T>) {
        self.handlers
            .borrow_mut()
            .retain(|(_, handler)| !handler.ptr_eq(dispatch));
    }
}
