//! The typed result of matching declared options against arguments.

use crate::config::OptionSpec;
use crate::parser::{FlagSet, ParseError};
use crate::value::OptionValue;
use serde::Serialize;
use std::collections::BTreeMap;

/// Options and positional arguments of a single command invocation.
///
/// Holds one value per declared option, whether or not it was given on
/// the command line. A context is never modified after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    options: BTreeMap<String, OptionValue>,
    arguments: Vec<String>,
}

impl Context {
    /// Parse `args` against the declared `options`.
    ///
    /// Options come first and use `-name`, `-name=value` or `-name value`
    /// (`--name` works the same). Parsing stops at the first positional
    /// argument or at `--`. Nothing is returned unless every option token
    /// parsed cleanly.
    pub fn build(options: &[OptionSpec], args: &[String]) -> Result<Context, ParseError> {
        let mut flags = FlagSet::new();
        for option in options {
            flags.register(option.name(), option.effective_default())?;
        }

        let parsed = flags.parse(args)?;
        Ok(Context {
            options: parsed.values,
            arguments: parsed.arguments,
        })
    }

    /// Value of a declared option.
    ///
    /// # Panics
    ///
    /// Panics if no option called `name` was declared.
    pub fn option(&self, name: &str) -> &OptionValue {
        match self.options.get(name) {
            Some(value) => value,
            None => panic!("option '{}' was not declared", name),
        }
    }

    /// Value of an option, or `None` if it was not declared.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    pub fn bool(&self, name: &str) -> bool {
        self.option(name).as_bool()
    }

    pub fn int(&self, name: &str) -> i64 {
        self.option(name).as_int()
    }

    pub fn string(&self, name: &str) -> &str {
        self.option(name).as_str()
    }

    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }

    /// Positional arguments left after option parsing, in order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}
