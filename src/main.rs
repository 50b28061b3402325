//! guinea - parse arguments against JSON command declarations.

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use guinea::{command_label, generate_help, Command, CommandConfig, Context, Prepared};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Program name used when neither the config nor --name provides one.
const DEFAULT_NAME: &str = "command";

/// Parse command-line arguments against declared options.
#[derive(Parser, Debug)]
#[command(name = "guinea", version, about, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse arguments and print the resulting context as JSON
    Parse {
        #[command(flatten)]
        source: ConfigSource,

        /// Arguments to parse for the target command
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the target command or one of its subcommands
    Help {
        #[command(flatten)]
        source: ConfigSource,

        /// Subcommand path, e.g. `remote add`
        path: Vec<String>,
    },
}

/// Where the command declarations come from.
#[derive(Args, Debug)]
struct ConfigSource {
    /// JSON declarations for the target command
    #[arg(long, env = "GUINEA_CONFIG")]
    config: Option<String>,

    /// File holding the JSON declarations (takes precedence over --config)
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Program name shown in messages (overrides config)
    #[arg(long)]
    name: Option<String>,
}

impl ConfigSource {
    /// Load and validate the declarations, returning the program name with them.
    fn load(&self) -> Result<(String, Command)> {
        let json = match (&self.config_file, &self.config) {
            (Some(path), _) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?,
            (None, Some(json)) => json.clone(),
            (None, None) => bail!("either --config or --config-file is required"),
        };

        let config = CommandConfig::from_json(&json).context("failed to parse config JSON")?;
        let name = self
            .name
            .clone()
            .or_else(|| config.name.clone())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let command = config.into_command().context("invalid config")?;
        Ok((name, command))
    }
}

/// JSON report printed by `guinea parse`.
#[derive(Serialize)]
struct ParseReport<'a> {
    command: &'a [&'a str],
    #[serde(flatten)]
    context: &'a Context,
}

/// Parse `args` and render either the JSON report or the requested help text.
fn parse_output(command: &Command, name: &str, args: &[String]) -> Result<String> {
    match command.prepare(name, args).context("failed to parse arguments")? {
        Prepared::Help(text) => Ok(text),
        Prepared::Invocation(invocation) => {
            let report = ParseReport {
                command: &invocation.path,
                context: &invocation.context,
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Render help for the subcommand named by `path`.
fn help_output(command: &Command, name: &str, path: &[String]) -> Result<String> {
    let resolved = command.resolve(path);
    if let Some(unknown) = resolved.args.first() {
        bail!(
            "unknown subcommand '{}' for {}",
            unknown,
            command_label(name, &resolved.path)
        );
    }
    Ok(generate_help(
        resolved.command,
        &command_label(name, &resolved.path),
    ))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GUINEA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { source, args } => {
            let (name, command) = source.load()?;
            debug!(program = %name, args = args.len(), "parsing arguments");
            print!("{}", parse_output(&command, &name, &args)?);
        }
        Commands::Help { source, path } => {
            let (name, command) = source.load()?;
            print!("{}", help_output(&command, &name, &path)?);
        }
    }

    Ok(())
}
