//! Usage text for declared commands, rendered with Clap.

use crate::command::Command;
use crate::config::{ArgumentSpec, OptionSpec};
use crate::value::OptionType;
use clap::{Arg, ArgAction};

/// Build a Clap Command mirroring a command's declarations.
///
/// Only used to render text; parsing never goes through Clap.
fn build_command(command: &Command, label: &str) -> clap::Command {
    let mut cmd = clap::Command::new(label.to_string())
        .disable_help_subcommand(true)
        .disable_help_flag(true);

    if let Some(about) = command
        .description
        .as_ref()
        .or(command.short_description.as_ref())
    {
        cmd = cmd.about(about.clone());
    }

    for option in &command.options {
        cmd = cmd.arg(build_option(option));
    }

    if !declares(command, "help") && !declares(command, "h") {
        cmd = cmd.arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help("Print help"),
        );
    }

    for (index, argument) in command.arguments.iter().enumerate() {
        cmd = cmd.arg(build_argument(argument, index + 1));
    }

    for (name, subcommand) in &command.subcommands {
        let mut sub = clap::Command::new(name.clone());
        if let Some(ref short) = subcommand.short_description {
            sub = sub.about(short.clone());
        }
        cmd = cmd.subcommand(sub);
    }

    cmd
}

fn declares(command: &Command, name: &str) -> bool {
    command.options.iter().any(|o| o.name() == name)
        || command.arguments.iter().any(|a| a.name == name)
}

/// Build a Clap Arg from an OptionSpec.
fn build_option(option: &OptionSpec) -> Arg {
    let mut arg = Arg::new(option.name().to_string()).long(option.name().to_string());

    match option.option_type() {
        OptionType::Bool => {
            arg = arg.action(ArgAction::SetTrue);
        }
        OptionType::String | OptionType::Int => {
            arg = arg
                .action(ArgAction::Set)
                .value_name(option.option_type().value_name());
            if let Some(default) = option.default() {
                arg = arg.default_value(default.to_string());
            }
        }
    }

    if let Some(help) = option.help() {
        arg = arg.help(help.to_string());
    }

    arg
}

/// Build a Clap positional Arg from an ArgumentSpec.
fn build_argument(argument: &ArgumentSpec, index: usize) -> Arg {
    let mut arg = Arg::new(argument.name.clone())
        .index(index)
        .required(!argument.optional);

    if argument.multiple {
        arg = arg.action(ArgAction::Append).num_args(1..);
    }

    if let Some(ref help) = argument.description {
        arg = arg.help(help.clone());
    }

    arg
}

/// Generate the full help text for a command.
///
/// `label` is the program name followed by the subcommand path.
pub fn generate_help(command: &Command, label: &str) -> String {
    let mut cmd = build_command(command, label);
    cmd.render_help().to_string()
}

/// Generate the one-line usage for a command.
pub fn generate_usage(command: &Command, label: &str) -> String {
    let mut cmd = build_command(command, label);
    cmd.render_usage().to_string()
}
