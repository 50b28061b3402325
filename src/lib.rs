//! guinea - typed command options for command-line tools.
//!
//! Commands declare their options (string, bool or int, each with a
//! default) and positional arguments. The process arguments are parsed
//! into a [`Context`] holding one typed value per declared option plus the
//! leftover positional arguments, which is handed to the command's handler.

pub mod command;
pub mod config;
pub mod context;
pub mod help;
pub mod parser;
pub mod value;

pub use command::{
    command_label, Command, CommandFn, Invocation, Outcome, Prepared, Resolved, RunError,
};
pub use config::{ArgumentSpec, CommandConfig, ConfigError, OptionSpec};
pub use context::Context;
pub use help::{generate_help, generate_usage};
pub use parser::ParseError;
pub use value::{OptionType, OptionValue, ValueError};
