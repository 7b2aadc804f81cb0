//! Config validation against a block type's declared JSON Schema.
//!
//! Validation never fails loudly: an unknown block type, a config schema that
//! does not compile and ordinary constraint violations all come back as
//! [`ConfigIssue`]s, distinguished by [`ConfigIssueKind`].

use crate::registry::{BlockTypeDefinition, Schema};
use serde::Serialize;
use serde_json::Value;

/// What kind of problem a [`ConfigIssue`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigIssueKind {
    /// The block name is not registered.
    UnknownBlockType,
    /// The block's config schema could not be compiled.
    InvalidSchema,
    /// The config violates the block's config schema.
    Constraint,
}

/// A single config validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    pub kind: ConfigIssueKind,
    /// JSON pointer into the config (`""` for the config itself).
    pub path: String,
    pub message: String,
}

/// Outcome of validating one config object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigValidation {
    pub valid: bool,
    pub errors: Vec<ConfigIssue>,
}

impl ConfigValidation {
    fn from_errors(errors: Vec<ConfigIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns true if no issues were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The first issue, if any.
    #[must_use]
    pub fn first(&self) -> Option<&ConfigIssue> {
        self.errors.first()
    }
}

/// Validates `config` against the config schema of block type `block_name`.
pub fn validate_config(schema: &Schema, block_name: &str, config: &Value) -> ConfigValidation {
    match schema.get(block_name) {
        Some(definition) => validate_config_against_definition(definition, config),
        None => ConfigValidation::from_errors(vec![ConfigIssue {
            kind: ConfigIssueKind::UnknownBlockType,
            path: String::new(),
            message: format!("Unknown block type: {block_name}"),
        }]),
    }
}

/// Validates `config` against an already looked-up block type.
///
/// Every violation is collected, not only the first.
pub fn validate_config_against_definition(
    definition: &BlockTypeDefinition,
    config: &Value,
) -> ConfigValidation {
    let validator = match definition.compiled_config() {
        Ok(validator) => validator,
        Err(message) => {
            return ConfigValidation::from_errors(vec![ConfigIssue {
                kind: ConfigIssueKind::InvalidSchema,
                path: String::new(),
                message: format!("Invalid config schema for block \"{}\": {message}", definition.name),
            }]);
        }
    };

    let errors = validator
        .iter_errors(config)
        .map(|error| ConfigIssue {
            kind: ConfigIssueKind::Constraint,
            path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();
    ConfigValidation::from_errors(errors)
}
