//! Subscription sources backed by tokio

pub mod interval;

pub use interval::Every;
