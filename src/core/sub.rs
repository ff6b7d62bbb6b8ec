use std::{cell::RefCell, fmt, rc::Rc};

use crate::{core::dispatch::Dispatch, Result};

/// An external event source that forwards its events to attached handlers
///
/// Handlers are identified by [`Dispatch::ptr_eq`]; `detach` must remove
/// exactly the handler that was passed to `attach` and stop any work done on
/// its behalf.
pub trait Watch<Msg> {
    fn attach(&self, dispatch: &Dispatch<Msg>) -> Result<()>;
    fn detach(&self, dispatch: &Dispatch<Msg>);
}

/// Subscription description, recomputed from the model every update cycle
pub enum Sub<Msg> {
    /// No subscription
    None,
    Source(Rc<dyn Watch<Msg>>),
    Batch(Vec<Sub<Msg>>),
}

impl<Msg: 'static> Sub<Msg> {
    pub fn none() -> Self {
        Sub::None
    }

    pub fn watch(source: Rc<dyn Watch<Msg>>) -> Self {
        Sub::Source(source)
    }

    /// Combine multiple subscriptions into one
    pub fn batch(subs: Vec<Sub<Msg>>) -> Self {
        let mut subs: Vec<Sub<Msg>> = subs.into_iter().filter(|sub| !sub.is_none()).collect();
        match subs.len() {
            0 => Sub::None,
            1 => subs.pop().unwrap_or(Sub::None),
            _ => Sub::Batch(subs),
        }
    }

    pub fn is_none(&self) -> bool {
        match self {
            Sub::None => true,
            Sub::Source(_) => false,
            Sub::Batch(subs) => subs.iter().all(Sub::is_none),
        }
    }

    /// Lift a subscription producing child messages into the parent message type
    pub fn map<Parent: 'static>(self, f: impl Fn(Msg) -> Parent + 'static) -> Sub<Parent> {
        if self.is_none() {
            return Sub::None;
        }
        Sub::Source(Rc::new(Mapped {
            inner: self,
            f: Rc::new(f),
            attached: RefCell::new(Vec::new()),
        }))
    }
}

impl<Msg> Sub<Msg> {
    pub fn attach(&self, dispatch: &Dispatch<Msg>) -> Result<()> {
        match self {
            Sub::None => Ok(()),
            Sub::Source(source) => source.attach(dispatch),
            Sub::Batch(subs) => subs.iter().try_for_each(|sub| sub.attach(dispatch)),
        }
    }

    pub fn detach(&self, dispatch: &Dispatch<Msg>) {
        match self {
            Sub::None => {}
            Sub::Source(source) => source.detach(dispatch),
            Sub::Batch(subs) => subs.iter().for_each(|sub| sub.detach(dispatch)),
        }
    }
}

impl<Msg> Clone for Sub<Msg> {
    fn clone(&self) -> Self {
        match self {
            Sub::None => Sub::None,
            Sub::Source(source) => Sub::Source(Rc::clone(source)),
            Sub::Batch(subs) => Sub::Batch(subs.clone()),
        }
    }
}

impl<Msg> Default for Sub<Msg> {
    fn default() -> Self {
        Sub::None
    }
}

impl<Msg> fmt::Debug for Sub<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sub::None => f.write_str("None"),
            Sub::Source(source) => write!(f, "Source({:p})", Rc::as_ptr(source)),
            Sub::Batch(subs) => f.debug_tuple("Batch").field(subs).finish(),
        }
    }
}

/// Child subscription seen through a message conversion
struct Mapped<Child, Parent> {
    inner: Sub<Child>,
    f: Rc<dyn Fn(Child) -> Parent>,
    // (parent handler, converted handler handed to the child)
    attached: RefCell<Vec<(Dispatch<Parent>, Dispatch<Child>)>>,
}

impl<Child: 'static, Parent: 'static> Watch<Parent> for Mapped<Child, Parent> {
    fn attach(&self, dispatch: &Dispatch<Parent>) -> Result<()> {
        let f = Rc::clone(&self.f);
        let child = dispatch.map(move |msg| f(msg));
        self.inner.attach(&child)?;
        self.attached.borrow_mut().push((dispatch.clone(), child));
        Ok(())
    }

    fn detach(&self, dispatch: &Dispatch<Parent>) {
        let removed: Vec<Dispatch<Child>> = {
            let mut attached = self.attached.borrow_mut();
            let (removed, kept) = attached
                .drain(..)
                .partition::<Vec<_>, _>(|(parent, _)| parent.ptr_eq(dispatch));
            *attached = kept;
            removed.into_iter().map(|(_, child)| child).collect()
        };
        for child in &removed {
            self.inner.detach(child);
        }
    }
}
