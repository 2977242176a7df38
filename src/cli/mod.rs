//! Command-line command implementations

pub mod commands;
