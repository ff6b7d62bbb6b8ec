use std::{fmt, future::Future, rc::Rc};

use futures::future::{FutureExt, LocalBoxFuture};

use crate::{core::dispatch::Dispatch, Result};

/// A single deferred side effect
pub type Effect<Msg> = Box<dyn FnOnce(&Dispatch<Msg>) -> Result<()>>;

/// Elm-like command definitions
/// Describes side effects to run after an update. Nothing happens until the
/// runtime calls [`Cmd::execute`]; an effect may then dispatch zero, one or
/// many messages, right away or later on.
pub enum Cmd<Msg> {
    // Do nothing
    None,
    // One effect
    Single(Effect<Msg>),
    // Batch command (execute multiple commands in order)
    Batch(Vec<Cmd<Msg>>),
}

impl<Msg: 'static> Cmd<Msg> {
    pub fn none() -> Self {
        Cmd::None
    }

    /// Run an arbitrary effect with access to the dispatch handle
    pub fn perform(effect: impl FnOnce(&Dispatch<Msg>) -> Result<()> + 'static) -> Self {
        Cmd::Single(Box::new(effect))
    }

    /// Dispatch `msg` synchronously as soon as the command executes
    pub fn msg(msg: Msg) -> Self {
        Cmd::perform(move |dispatch| dispatch.dispatch(msg))
    }

    /// Spawn `future` on the current `LocalSet` and dispatch its output
    ///
    /// The message is delivered on the runtime's thread once the future
    /// resolves. A dispatch failure at that point has no caller left to
    /// report to and is logged instead.
    ///
    /// # Panics
    ///
    /// Executing the command outside of a `tokio::task::LocalSet` panics.
    pub fn task(future: impl Future<Output = Msg> + 'static) -> Self {
        let future: LocalBoxFuture<'static, Msg> = future.boxed_local();
        Cmd::perform(move |dispatch| {
            let dispatch = dispatch.clone();
            tokio::task::spawn_local(async move {
                let msg = future.await;
                if let Err(e) = dispatch.dispatch(msg) {
                    tracing::error!("Dispatch from task failed: {e:?}");
                }
            });
            Ok(())
        })
    }

    /// Combine multiple commands into one
    pub fn batch(commands: Vec<Cmd<Msg>>) -> Self {
        let mut commands: Vec<Cmd<Msg>> =
            commands.into_iter().filter(|cmd| !cmd.is_none()).collect();
        match commands.len() {
            0 => Cmd::None,
            1 => commands.pop().unwrap_or(Cmd::None),
            _ => Cmd::Batch(commands),
        }
    }

    pub fn is_none(&self) -> bool {
        match self {
            Cmd::None => true,
            Cmd::Single(_) => false,
            Cmd::Batch(cmds) => cmds.iter().all(Cmd::is_none),
        }
    }

    /// Lift a command producing child messages into the parent message type
    pub fn map<Parent: 'static>(self, f: impl Fn(Msg) -> Parent + 'static) -> Cmd<Parent> {
        self.map_shared(Rc::new(f))
    }

    fn map_shared<Parent: 'static>(self, f: Rc<dyn Fn(Msg) -> Parent>) -> Cmd<Parent> {
        match self {
            Cmd::None => Cmd::None,
            Cmd::Single(effect) => Cmd::perform(move |dispatch: &Dispatch<Parent>| {
                effect(&dispatch.map(move |msg| f(msg)))
            }),
            Cmd::Batch(cmds) => Cmd::Batch(
                cmds.into_iter()
                    .map(|cmd| cmd.map_shared(Rc::clone(&f)))
                    .collect(),
            ),
        }
    }

    /// Run every effect in order, stopping at the first failure
    pub fn execute(self, dispatch: &Dispatch<Msg>) -> Result<()> {
        match self {
            Cmd::None => Ok(()),
            Cmd::Single(effect) => effect(dispatch),
            Cmd::Batch(cmds) => cmds.into_iter().try_for_each(|cmd| cmd.execute(dispatch)),
        }
    }
}

impl<Msg> Default for Cmd<Msg> {
    fn default() -> Self {
        Cmd::None
    }
}

impl<Msg> fmt::Debug for Cmd<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::None => f.write_str("None"),
            Cmd::Single(_) => f.write_str("Single(..)"),
            Cmd::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
        }
    }
}
