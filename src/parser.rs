//! Flag parsing against a set of declared, typed options.

use crate::value::{OptionType, OptionValue, ValueError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during argument parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("flag provided but not defined: -{0}")]
    UnknownOption(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid {expected} value {value:?} for flag -{option}: {source}")]
    TypeConversion {
        option: String,
        value: String,
        expected: OptionType,
        source: ValueError,
    },

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    #[error("option declared more than once: {0}")]
    DuplicateOption(String),

    /// `-h` or `-help` was given and no option of that name is declared.
    #[error("help requested")]
    HelpRequested,
}

/// Values and leftover arguments produced by a [`FlagSet`].
#[derive(Debug)]
pub(crate) struct Parsed {
    pub values: BTreeMap<String, OptionValue>,
    pub arguments: Vec<String>,
}

/// A single-use set of typed flag cells.
///
/// Every parse starts from a fresh set, so nothing is shared between calls.
#[derive(Debug, Default)]
pub(crate) struct FlagSet {
    cells: BTreeMap<String, OptionValue>,
}

impl FlagSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a flag holding `default` until the arguments say otherwise.
    pub(crate) fn register(&mut self, name: &str, default: OptionValue) -> Result<(), ParseError> {
        if self.cells.contains_key(name) {
            return Err(ParseError::DuplicateOption(name.to_string()));
        }
        self.cells.insert(name.to_string(), default);
        Ok(())
    }

    /// Consume flags from the front of `args`.
    ///
    /// Parsing stops at the first token that is not a flag, or after `--`.
    /// That token (minus a `--`) and everything behind it are returned as
    /// positional arguments.
    pub(crate) fn parse(mut self, args: &[String]) -> Result<Parsed, ParseError> {
        let mut index = 0;

        while let Some(arg) = args.get(index) {
            // "-" on its own is a positional argument, like a non-flag
            if arg.len() < 2 || !arg.starts_with('-') {
                break;
            }
            index += 1;
            if arg == "--" {
                break;
            }

            let flag = arg.strip_prefix("--").unwrap_or(&arg[1..]);
            if flag.is_empty() || flag.starts_with('-') || flag.starts_with('=') {
                return Err(ParseError::BadSyntax(arg.clone()));
            }

            let (name, inline_value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };

            let current = match self.cells.get(name) {
                Some(current) => current,
                None if name == "h" || name == "help" => return Err(ParseError::HelpRequested),
                None => return Err(ParseError::UnknownOption(name.to_string())),
            };

            let text = match (current.option_type(), inline_value) {
                (_, Some(value)) => value,
                (OptionType::Bool, None) => "true",
                (_, None) => {
                    let value = args
                        .get(index)
                        .ok_or_else(|| ParseError::MissingValue(name.to_string()))?;
                    index += 1;
                    value.as_str()
                }
            };

            let value = current
                .parse_as(text)
                .map_err(|source| ParseError::TypeConversion {
                    option: name.to_string(),
                    value: text.to_string(),
                    expected: current.option_type(),
                    source,
                })?;
            self.cells.insert(name.to_string(), value);
        }

        Ok(Parsed {
            values: self.cells,
            arguments: args[index..].to_vec(),
        })
    }
}
