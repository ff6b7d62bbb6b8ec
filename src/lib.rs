//! # elmloop - Elm-style update loop
//!
//! A deterministic, single-threaded runtime for the Elm architecture: the
//! model is owned by the runtime and only ever replaced by the update
//! function in response to messages.
//!
//! ## Architecture Overview
//!
//! - **Model**: any `Clone + PartialEq` value
//! - **Message** (`Msg`): events that can change the model
//! - **Update** ([`Updater`]): pure `(Msg, &Model) -> (Model, Cmd)`
//! - **Command** ([`Cmd`]): deferred side effects that may dispatch messages
//! - **Subscription** ([`Sub`]): external event sources derived from the model
//! - **View** ([`Renderer`]): receives the model whenever it changes
//!
//! ## Example Usage
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use elmloop::{Cmd, Result, Runtime};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Model { count: u32 }
//!
//! enum Msg { Increment }
//!
//! let rendered = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&rendered);
//!
//! let runtime = Runtime::new(
//!     || (Model { count: 0 }, Cmd::none()),
//!     |msg: Msg, model: &Model| -> Result<(Model, Cmd<Msg>)> {
//!         match msg {
//!             Msg::Increment => Ok((Model { count: model.count + 1 }, Cmd::none())),
//!         }
//!     },
//!     move |model: &Model| -> Result<()> {
//!         sink.borrow_mut().push(model.count);
//!         Ok(())
//!     },
//! )?;
//!
//! runtime.dispatch(Msg::Increment)?;
//! assert_eq!(*rendered.borrow(), vec![0, 1]);
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Runtime, commands, subscriptions and the event hub
//! - [`infrastructure`] - Configuration, CLI and timer subscriptions
//! - [`presentation`] - Console renderer used by the binary
//! - [`app`] - Counter application run by the binary
//! - [`utils`] - Logging, panic handling and paths

pub mod app;
pub mod core;
pub mod infrastructure;
pub mod presentation;
pub mod utils;

// Re-exports for convenience
pub use crate::core::{
    app::{Renderer, Updater},
    cmd::Cmd,
    dispatch::Dispatch,
    event::{Event, HandlerId},
    runtime::{Runtime, RuntimeStats},
    sub::{Sub, Watch},
};
pub use infrastructure::subscription::Every;

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
