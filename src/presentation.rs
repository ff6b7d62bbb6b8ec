//! Presentation layer
//!
//! Renderers turning models into visible output.

pub mod console;
