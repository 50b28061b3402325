//! Command trees: subcommand resolution, context building and dispatch.

use crate::config::{
    validate_declarations, validate_subcommand_name, ArgumentSpec, ConfigError, OptionSpec,
};
use crate::context::Context;
use crate::help::generate_help;
use crate::parser::ParseError;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Handler invoked with the parsed context of its command.
pub type CommandFn = fn(&Context) -> anyhow::Result<()>;

/// Errors that can occur while dispatching a command.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid command declaration: {0}")]
    Config(#[from] ConfigError),

    #[error("{command}: {source}")]
    Parse {
        command: String,
        #[source]
        source: ParseError,
    },

    #[error("{command}: expected {expected} argument(s), got {got}")]
    InvalidArguments {
        command: String,
        expected: String,
        got: usize,
    },

    #[error("{0}: command cannot be run, choose a subcommand")]
    NoHandler(String),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// A command with its options, positional arguments and subcommands.
#[derive(Debug, Clone, Default)]
pub struct Command {
    pub run: Option<CommandFn>,
    pub options: Vec<OptionSpec>,
    pub arguments: Vec<ArgumentSpec>,
    pub subcommands: BTreeMap<String, Command>,
    pub short_description: Option<String>,
    pub description: Option<String>,
}

/// A command selected from the leading arguments.
#[derive(Debug)]
pub struct Resolved<'a> {
    /// Subcommand names walked from the root.
    pub path: Vec<&'a str>,
    pub command: &'a Command,
    /// Arguments that follow the subcommand names.
    pub args: &'a [String],
}

/// A command ready to run.
#[derive(Debug)]
pub struct Invocation<'a> {
    pub path: Vec<&'a str>,
    pub command: &'a Command,
    pub context: Context,
}

/// Outcome of preparing a command.
#[derive(Debug)]
pub enum Prepared<'a> {
    Invocation(Invocation<'a>),
    /// Help was requested; holds the rendered usage text.
    Help(String),
}

/// Outcome of executing a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Help(String),
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, run: CommandFn) -> Self {
        self.run = Some(run);
        self
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = OptionSpec>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn argument(mut self, argument: ArgumentSpec) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn arguments(mut self, arguments: impl IntoIterator<Item = ArgumentSpec>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn subcommand(mut self, name: impl Into<String>, command: Command) -> Self {
        self.subcommands.insert(name.into(), command);
        self
    }

    pub fn short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Validate this command and all of its subcommands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_declarations(&self.options, &self.arguments)?;
        for (name, subcommand) in &self.subcommands {
            validate_subcommand_name(name)?;
            subcommand.validate()?;
        }
        Ok(())
    }

    /// Walk subcommands named by the leading arguments.
    pub fn resolve<'a>(&'a self, args: &'a [String]) -> Resolved<'a> {
        let mut command = self;
        let mut path = Vec::new();
        let mut rest = args;

        while let Some((first, tail)) = rest.split_first() {
            match command.subcommands.get_key_value(first.as_str()) {
                Some((name, subcommand)) => {
                    path.push(name.as_str());
                    command = subcommand;
                    rest = tail;
                }
                None => break,
            }
        }

        Resolved {
            path,
            command,
            args: rest,
        }
    }

    /// Select the command named by `args` and parse the rest of them.
    ///
    /// `program` is only used to label errors and usage text.
    pub fn prepare<'a>(
        &'a self,
        program: &str,
        args: &'a [String],
    ) -> Result<Prepared<'a>, RunError> {
        let Resolved {
            path,
            command,
            args,
        } = self.resolve(args);
        let label = command_label(program, &path);
        debug!(command = %label, args = args.len(), "resolved command");

        validate_declarations(&command.options, &command.arguments)?;

        let context = match Context::build(&command.options, args) {
            Ok(context) => context,
            Err(ParseError::HelpRequested) => {
                debug!(command = %label, "help requested");
                return Ok(Prepared::Help(generate_help(command, &label)));
            }
            Err(source) => {
                return Err(RunError::Parse {
                    command: label,
                    source,
                })
            }
        };

        command.check_arity(&label, context.arguments().len())?;

        Ok(Prepared::Invocation(Invocation {
            path,
            command,
            context,
        }))
    }

    /// Prepare and run the selected command's handler.
    pub fn execute(&self, program: &str, args: &[String]) -> Result<Outcome, RunError> {
        let invocation = match self.prepare(program, args)? {
            Prepared::Invocation(invocation) => invocation,
            Prepared::Help(text) => return Ok(Outcome::Help(text)),
        };

        let label = command_label(program, &invocation.path);
        let run = invocation
            .command
            .run
            .ok_or_else(|| RunError::NoHandler(label.clone()))?;

        debug!(command = %label, "running handler");
        run(&invocation.context)?;
        Ok(Outcome::Completed)
    }

    /// Check the number of positional arguments against the declarations.
    fn check_arity(&self, label: &str, got: usize) -> Result<(), RunError> {
        let required = self.arguments.iter().filter(|a| !a.optional).count();
        let variadic = self.arguments.last().map_or(false, |a| a.multiple);
        let max = self.arguments.len();

        if got >= required && (variadic || got <= max) {
            return Ok(());
        }

        let expected = if variadic {
            format!("at least {}", required)
        } else if required == max {
            required.to_string()
        } else {
            format!("{} to {}", required, max)
        };
        Err(RunError::InvalidArguments {
            command: label.to_string(),
            expected,
            got,
        })
    }
}

/// Program name followed by the subcommand path, e.g. `tool remote add`.
pub fn command_label(program: &str, path: &[&str]) -> String {
    std::iter::once(program)
        .chain(path.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
