//! Core Elm Architecture implementation
//!
//! This module contains the core components of the Elm architecture:
//! - Dispatch handles through which messages enter the loop
//! - Commands and subscriptions describing side effects
//! - Updater and renderer contracts
//! - The runtime driving the update cycle

pub mod app;
pub mod cmd;
pub mod dispatch;
pub mod event;
pub mod runtime;
pub mod sub;
