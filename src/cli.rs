//! Command-line interface components.

pub mod args;
pub mod commands;

pub use self::args::{Args, Commands};
pub use self::commands::run;
