//! Infrastructure layer
//!
//! This module handles host integrations:
//! - CLI argument processing
//! - Configuration loading
//! - Timer-based subscription sources

pub mod cli;
pub mod config;
pub mod subscription;
