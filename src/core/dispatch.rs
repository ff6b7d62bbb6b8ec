use std::{fmt, rc::Rc};

use crate::Result;

/// Entry point through which messages re-enter an update loop
///
/// A `Dispatch` is handed to commands when they execute, to subscription
/// sources when they are attached and to the renderer once at start-up.
/// Cloning is cheap; clones share identity, which is what subscription
/// sources use to find the handler they must detach.
pub struct Dispatch<Msg> {
    callback: Rc<dyn Fn(Msg) -> Result<()>>,
}

impl<Msg: 'static> Dispatch<Msg> {
    /// Wrap a callback as a dispatch handle
    pub fn new(callback: impl Fn(Msg) -> Result<()> + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Feed a message into the loop, returning whatever the loop returned
    pub fn dispatch(&self, msg: Msg) -> Result<()> {
        (self.callback)(msg)
    }

    /// Build a handle for a child message type that converts into `Msg`
    pub fn map<Child: 'static>(&self, f: impl Fn(Child) -> Msg + 'static) -> Dispatch<Child> {
        let parent = self.clone();
        Dispatch::new(move |child| parent.dispatch(f(child)))
    }

    /// Whether both handles point at the same callback
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<Msg> Clone for Dispatch<Msg> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<Msg> fmt::Debug for Dispatch<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("callback", &Rc::as_ptr(&self.callback))
            .finish()
    }
}
