//! Option and argument declarations, and their JSON configuration form.

use crate::command::Command;
use crate::value::{OptionType, OptionValue};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while loading or validating declarations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("default for option '{option}' must be a {expected} value")]
    DefaultTypeMismatch {
        option: String,
        expected: OptionType,
    },

    #[error("invalid option name '{0}': must be non-empty, not start with '-' and not contain '='")]
    InvalidOptionName(String),

    #[error("duplicate option or argument name: {0}")]
    DuplicateName(String),

    #[error("argument '{0}' accepts multiple values but is not the last argument")]
    MultipleNotLast(String),

    #[error("required argument '{0}' follows an optional argument")]
    RequiredAfterOptional(String),

    #[error("invalid subcommand name '{0}': must be non-empty and not start with '-'")]
    InvalidSubcommandName(String),

    #[error("subcommand has no name")]
    UnnamedSubcommand,

    #[error("duplicate subcommand name: {0}")]
    DuplicateSubcommandName(String),
}

/// Declaration of a named, typed option with a default value.
///
/// The default is stored as an [`OptionValue`], so it always has the
/// declared type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawOptionSpec")]
pub struct OptionSpec {
    name: String,
    option_type: OptionType,
    default: Option<OptionValue>,
    description: Option<String>,
}

impl OptionSpec {
    /// Declare an option that defaults to the zero value of its type.
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            option_type,
            default: None,
            description: None,
        }
    }

    /// Declare an option whose type is taken from its default.
    pub fn with_default(name: impl Into<String>, default: impl Into<OptionValue>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            option_type: default.option_type(),
            default: Some(default),
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, OptionType::Int)
    }

    /// Attach help text.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// The declared default, if any.
    pub fn default(&self) -> Option<&OptionValue> {
        self.default.as_ref()
    }

    /// The declared default, or the zero value of the option's type.
    pub fn effective_default(&self) -> OptionValue {
        self.default
            .clone()
            .unwrap_or_else(|| self.option_type.zero_value())
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Untyped option declaration as it appears in JSON.
#[derive(Deserialize)]
struct RawOptionSpec {
    name: String,
    #[serde(rename = "type")]
    option_type: OptionType,
    #[serde(default)]
    default: Option<serde_json::Value>,
    description: Option<String>,
}

impl TryFrom<RawOptionSpec> for OptionSpec {
    type Error = ConfigError;

    fn try_from(raw: RawOptionSpec) -> Result<Self, Self::Error> {
        let default = match raw.default {
            None => None,
            Some(value) => {
                let typed = match (raw.option_type, value) {
                    (OptionType::String, serde_json::Value::String(s)) => {
                        Some(OptionValue::String(s))
                    }
                    (OptionType::Bool, serde_json::Value::Bool(b)) => Some(OptionValue::Bool(b)),
                    (OptionType::Int, serde_json::Value::Number(n)) => {
                        n.as_i64().map(OptionValue::Int)
                    }
                    _ => None,
                };
                Some(typed.ok_or_else(|| ConfigError::DefaultTypeMismatch {
                    option: raw.name.clone(),
                    expected: raw.option_type,
                })?)
            }
        };

        Ok(OptionSpec {
            name: raw.name,
            option_type: raw.option_type,
            default,
            description: raw.description,
        })
    }
}

/// Declaration of a positional argument.
///
/// Only used for usage text and for checking how many positional
/// arguments a command accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    /// The argument may be left out.
    #[serde(default)]
    pub optional: bool,
    /// The argument soaks up every remaining value. Only valid on the last argument.
    #[serde(default)]
    pub multiple: bool,
    pub description: Option<String>,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            multiple: false,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// A command tree loaded from JSON.
///
/// Handlers cannot be expressed in JSON, so commands built from a config
/// have none; they are used to parse and describe arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    /// Name of the command. Required on subcommands.
    pub name: Option<String>,
    /// One-line summary shown in the parent's subcommand list
    pub short_description: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    #[serde(default)]
    pub subcommands: Vec<CommandConfig>,
}

impl CommandConfig {
    /// Parse a JSON string into a CommandConfig.
    pub fn from_json(json: &str) -> Result<CommandConfig, ConfigError> {
        let config: CommandConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Convert into a validated [`Command`] tree.
    pub fn into_command(self) -> Result<Command, ConfigError> {
        let command = self.build()?;
        command.validate()?;
        Ok(command)
    }

    fn build(self) -> Result<Command, ConfigError> {
        let mut command = Command::new()
            .options(self.options)
            .arguments(self.arguments);
        command.short_description = self.short_description;
        command.description = self.description;

        for subcommand in self.subcommands {
            let name = subcommand
                .name
                .clone()
                .ok_or(ConfigError::UnnamedSubcommand)?;
            if command.subcommands.contains_key(&name) {
                return Err(ConfigError::DuplicateSubcommandName(name));
            }
            command.subcommands.insert(name, subcommand.build()?);
        }

        Ok(command)
    }
}

/// Validate the option and argument declarations of a single command.
pub(crate) fn validate_declarations(
    options: &[OptionSpec],
    arguments: &[ArgumentSpec],
) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for option in options {
        if !is_valid_option_name(option.name()) {
            return Err(ConfigError::InvalidOptionName(option.name().to_string()));
        }
        if !names.insert(option.name()) {
            return Err(ConfigError::DuplicateName(option.name().to_string()));
        }
    }

    let mut seen_optional = false;
    for (i, argument) in arguments.iter().enumerate() {
        if !names.insert(argument.name.as_str()) {
            return Err(ConfigError::DuplicateName(argument.name.clone()));
        }
        if argument.multiple && i + 1 != arguments.len() {
            return Err(ConfigError::MultipleNotLast(argument.name.clone()));
        }
        if argument.optional {
            seen_optional = true;
        } else if seen_optional {
            return Err(ConfigError::RequiredAfterOptional(argument.name.clone()));
        }
    }

    Ok(())
}

/// Names end at '=' and cannot look like another dash, so both are rejected.
fn is_valid_option_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.contains('=')
}

pub(crate) fn validate_subcommand_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.starts_with('-') {
        return Err(ConfigError::InvalidSubcommandName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "name": "deploy",
            "short_description": "Deploy things",
            "description": "Deploys things to places.",
            "options": [
                {"name": "verbose", "type": "bool", "description": "Be chatty"},
                {"name": "retries", "type": "int", "default": 3},
                {"name": "region", "type": "string", "default": "eu-west-1"}
            ],
            "arguments": [
                {"name": "target", "description": "What to deploy"},
                {"name": "extra", "optional": true, "multiple": true}
            ]
        }"#;

        let config = CommandConfig::from_json(json).unwrap();
        assert_eq!(config.name, Some("deploy".to_string()));
        assert_eq!(config.short_description, Some("Deploy things".to_string()));
        assert_eq!(config.options.len(), 3);
        assert_eq!(config.arguments.len(), 2);

        let verbose = &config.options[0];
        assert_eq!(verbose.name(), "verbose");
        assert_eq!(verbose.option_type(), OptionType::Bool);
        assert_eq!(verbose.default(), None);
        assert_eq!(verbose.help(), Some("Be chatty"));

        let retries = &config.options[1];
        assert_eq!(retries.option_type(), OptionType::Int);
        assert_eq!(retries.default(), Some(&OptionValue::Int(3)));

        let region = &config.options[2];
        assert_eq!(region.effective_default(), OptionValue::from("eu-west-1"));

        let extra = &config.arguments[1];
        assert!(extra.optional);
        assert!(extra.multiple);

        config.into_command().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = CommandConfig::from_json("{}").unwrap();
        assert!(config.name.is_none());
        assert!(config.options.is_empty());
        assert!(config.arguments.is_empty());
        assert!(config.subcommands.is_empty());
    }

    #[test]
    fn test_null_default_is_zero_value() {
        let config =
            CommandConfig::from_json(r#"{"options":[{"name":"n","type":"int","default":null}]}"#)
                .unwrap();
        assert_eq!(config.options[0].default(), None);
        assert_eq!(config.options[0].effective_default(), OptionValue::Int(0));
    }

    #[test]
    fn test_error_default_type_mismatch() {
        let cases = [
            r#"{"name":"n","type":"int","default":"three"}"#,
            r#"{"name":"n","type":"int","default":1.5}"#,
            r#"{"name":"n","type":"bool","default":1}"#,
            r#"{"name":"n","type":"string","default":false}"#,
        ];
        for option in cases {
            let json = format!(r#"{{"options":[{}]}}"#, option);
            let result = CommandConfig::from_json(&json);
            assert!(
                matches!(&result, Err(ConfigError::ParseError(e)) if e.to_string().contains("default for option 'n'")),
                "{}: {:?}",
                option,
                result
            );
        }
    }

    #[test]
    fn test_error_unknown_option_type() {
        let result = CommandConfig::from_json(r#"{"options":[{"name":"n","type":"float"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_option_spec_constructors() {
        assert_eq!(OptionSpec::string("s").effective_default(), OptionValue::from(""));
        assert_eq!(OptionSpec::bool("b").effective_default(), OptionValue::from(false));
        assert_eq!(OptionSpec::int("i").effective_default(), OptionValue::from(0));

        let spec = OptionSpec::with_default("retries", 3).description("How often");
        assert_eq!(spec.option_type(), OptionType::Int);
        assert_eq!(spec.default(), Some(&OptionValue::Int(3)));
        assert_eq!(spec.help(), Some("How often"));
    }

    #[test]
    fn test_validate_accepts_good_declarations() {
        let options = vec![OptionSpec::bool("v"), OptionSpec::int("count")];
        let arguments = vec![
            ArgumentSpec::new("input"),
            ArgumentSpec::new("rest").optional().multiple(),
        ];
        validate_declarations(&options, &arguments).unwrap();
    }

    #[test]
    fn test_error_invalid_option_names() {
        for name in ["", "-v", "a=b"] {
            let result = validate_declarations(&[OptionSpec::bool(name)], &[]);
            assert!(
                matches!(result, Err(ConfigError::InvalidOptionName(ref n)) if n == name),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn test_error_duplicate_option_names() {
        let options = vec![OptionSpec::bool("dup"), OptionSpec::int("dup")];
        let result = validate_declarations(&options, &[]);
        assert!(matches!(result, Err(ConfigError::DuplicateName(name)) if name == "dup"));
    }

    #[test]
    fn test_error_argument_shadows_option() {
        let result = validate_declarations(&[OptionSpec::bool("file")], &[ArgumentSpec::new("file")]);
        assert!(matches!(result, Err(ConfigError::DuplicateName(name)) if name == "file"));
    }

    #[test]
    fn test_error_multiple_not_last() {
        let arguments = vec![ArgumentSpec::new("files").multiple(), ArgumentSpec::new("dest")];
        let result = validate_declarations(&[], &arguments);
        assert!(matches!(result, Err(ConfigError::MultipleNotLast(name)) if name == "files"));
    }

    #[test]
    fn test_error_required_after_optional() {
        let arguments = vec![ArgumentSpec::new("src").optional(), ArgumentSpec::new("dest")];
        let result = validate_declarations(&[], &arguments);
        assert!(matches!(result, Err(ConfigError::RequiredAfterOptional(name)) if name == "dest"));
    }

    #[test]
    fn test_subcommands_into_command() {
        let json = r#"{
            "name": "tool",
            "subcommands": [
                {"name": "build", "short_description": "Build it",
                 "options": [{"name": "release", "type": "bool"}]},
                {"name": "remote", "subcommands": [{"name": "add"}]}
            ]
        }"#;
        let command = CommandConfig::from_json(json).unwrap().into_command().unwrap();
        assert_eq!(command.subcommands.len(), 2);
        let build = &command.subcommands["build"];
        assert_eq!(build.short_description.as_deref(), Some("Build it"));
        assert_eq!(build.options.len(), 1);
        assert!(command.subcommands["remote"].subcommands.contains_key("add"));
        assert!(build.run.is_none());
    }

    #[test]
    fn test_error_unnamed_subcommand() {
        let config = CommandConfig::from_json(r#"{"subcommands":[{}]}"#).unwrap();
        assert!(matches!(
            config.into_command(),
            Err(ConfigError::UnnamedSubcommand)
        ));
    }

    #[test]
    fn test_error_duplicate_subcommand_name() {
        let config =
            CommandConfig::from_json(r#"{"subcommands":[{"name":"a"},{"name":"a"}]}"#).unwrap();
        assert!(matches!(
            config.into_command(),
            Err(ConfigError::DuplicateSubcommandName(name)) if name == "a"
        ));
    }

    #[test]
    fn test_error_invalid_subcommand_name() {
        let config = CommandConfig::from_json(r#"{"subcommands":[{"name":"-x"}]}"#).unwrap();
        assert!(matches!(
            config.into_command(),
            Err(ConfigError::InvalidSubcommandName(name)) if name == "-x"
        ));
    }

    #[test]
    fn test_error_invalid_nested_declaration() {
        let config = CommandConfig::from_json(
            r#"{"subcommands":[{"name":"a","options":[
                {"name":"x","type":"bool"},{"name":"x","type":"int"}
            ]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            config.into_command(),
            Err(ConfigError::DuplicateName(name)) if name == "x"
        ));
    }
}
