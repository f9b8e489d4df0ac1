//! Command implementations for the semdiff CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod diff;
pub mod show;
