//! Build-time validation of schema field sets.
//!
//! Catches configuration mistakes (reserved help names, duplicate or
//! malformed flags, choices on presence flags) before any command runs.
//!
//! # Examples
//!
//! ```
//! use autocli_core::*;
//!
//! let fields = vec![param("name", ValueKind::String, "World").short("-n")];
//! assert!(validate_fields(&fields).is_empty());
//!
//! // Invalid: `help` is reserved
//! let bad = vec![param("help", ValueKind::Boolean, false)];
//! assert_eq!(validate_fields(&bad), vec![ConfigError::ReservedHelpField]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{FieldDescriptor, HELP_FIELD, HELP_FLAG, POSITIONAL_ID};

/// Configuration errors raised while building a CLI.
///
/// Every variant is fatal: the application cannot be constructed until the
/// schema or registration is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field is literally named `help`.
    #[error("field name 'help' is reserved for the --help option")]
    ReservedHelpField,
    /// A field declares `--help` as its long alias.
    #[error("'--help' is reserved and cannot be used as an alias (field '{0}')")]
    ReservedHelpFlag(String),
    /// Field name is empty.
    #[error("schema field name cannot be empty")]
    EmptyFieldName,
    /// Short flag is not a dash followed by a single character.
    #[error("invalid short flag format: {0}")]
    InvalidShortFlag(String),
    /// Long flag does not start with `--` or is too short.
    #[error("invalid long flag format: {0}")]
    InvalidLongFlag(String),
    /// Two fields of one schema map to the same flag.
    #[error("duplicate flag in schema: {0}")]
    DuplicateFlag(String),
    /// A boolean field declares choices.
    #[error("boolean field '{0}' cannot declare choices")]
    ChoicesOnBoolean(String),
    /// A choice does not parse as the field's element type.
    #[error("choice '{choice}' of field '{field}' does not match the field type")]
    InvalidChoice { field: String, choice: String },
    /// Handler member name does not fit `run_<command>`.
    #[error("invalid command name: {0}")]
    InvalidCommandName(String),
    /// Two handlers register the same subcommand.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),
}

/// Validates the fields of one schema.
///
/// Stops at the first problem, like the rest of the build pipeline.
pub fn validate_fields(fields: &[FieldDescriptor]) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(HELP_FLAG.to_string());
    // Distinct flags such as `--dry-run` and `--dry_run` share one parser id.
    let mut ids: HashSet<String> = [HELP_FIELD, POSITIONAL_ID]
        .into_iter()
        .map(String::from)
        .collect();

    for field in fields {
        if field.name.trim().is_empty() {
            errors.push(ConfigError::EmptyFieldName);
            return errors;
        }
        if field.name == HELP_FIELD {
            errors.push(ConfigError::ReservedHelpField);
            return errors;
        }

        let long = field.long_flag();
        if long == HELP_FLAG {
            errors.push(ConfigError::ReservedHelpFlag(field.name.clone()));
            return errors;
        }
        if !long.starts_with("--") || long.len() < 3 || long[2..].starts_with('-') {
            errors.push(ConfigError::InvalidLongFlag(long));
            return errors;
        }
        if !seen.insert(long.clone()) || !ids.insert(field.flag_id()) {
            errors.push(ConfigError::DuplicateFlag(long));
            return errors;
        }

        if let Some(short) = &field.short {
            if !short.starts_with('-') || short.starts_with("--") || short.chars().count() != 2 {
                errors.push(ConfigError::InvalidShortFlag(short.clone()));
                return errors;
            }
            if !seen.insert(short.clone()) {
                errors.push(ConfigError::DuplicateFlag(short.clone()));
                return errors;
            }
        }

        if let Some(choices) = &field.choices {
            let Some(primitive) = field.kind.primitive() else {
                errors.push(ConfigError::ChoicesOnBoolean(field.name.clone()));
                return errors;
            };
            if let Some(bad) = choices.iter().find(|c| !choice_fits(primitive, c)) {
                errors.push(ConfigError::InvalidChoice {
                    field: field.name.clone(),
                    choice: bad.clone(),
                });
                return errors;
            }
        }
    }

    errors
}

fn choice_fits(primitive: crate::Primitive, choice: &str) -> bool {
    match primitive {
        crate::Primitive::String => true,
        crate::Primitive::Integer => choice.parse::<i64>().is_ok(),
        crate::Primitive::Float => choice.parse::<f64>().is_ok(),
    }
}
