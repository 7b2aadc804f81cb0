//! Page context and context overrides.
//!
//! A page context is a namespaced JSON object (`{"forms": {"values": ...}}`)
//! supplied by the host at render time. A node can carry a list of
//! [`ContextOverride`]s under `config.contextOverrides`; each one compares a
//! context value and, when it matches, sets a config property or the node's
//! visibility.

use blockgraph_types::Config;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Config key holding a node's overrides.
pub const CONTEXT_OVERRIDES_KEY: &str = "contextOverrides";

/// Namespaced runtime context.
pub type PageContext = Map<String, Value>;

/// How a context value is compared. Anything but `eq`, including a missing
/// condition, negates the comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextCondition {
    Eq,
    #[default]
    #[serde(other)]
    Neq,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ContextEffect {
    /// Sets `config[config_property]` to `config_value`.
    Config {
        config_property: String,
        #[serde(default)]
        config_value: Value,
    },
    /// Shows or hides the node.
    Visibility {
        #[serde(default)]
        visible: bool,
    },
}

/// One conditional adjustment of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextOverride {
    /// Dot-separated path into the page context.
    pub context_path: String,
    #[serde(default)]
    pub condition: ContextCondition,
    /// Expected value. `None` when the key is absent, which is not the same
    /// as an explicit `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub context_value: Option<Value>,
    pub effect: ContextEffect,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ContextOverride {
    /// Returns true if the override applies under `context`.
    ///
    /// A missing context value only equals a missing expected value; the
    /// strings `"true"` and `"false"` compare equal to the matching booleans.
    #[must_use]
    pub fn matches(&self, context: &PageContext) -> bool {
        let actual = get_context_value(context, &self.context_path).map(loosen);
        let expected = self.context_value.as_ref().map(loosen);
        let equal = actual == expected;
        match self.condition {
            ContextCondition::Eq => equal,
            ContextCondition::Neq => !equal,
        }
    }
}

/// A node's config and visibility after overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub config: Config,
    pub visible: bool,
}

/// Computes the effective config of a node under `context`.
///
/// The overrides key is removed from the result. Matching overrides apply
/// in order, so the last one to touch a property or visibility wins.
/// Entries that do not describe an override are skipped.
pub fn apply_context_overrides(raw: &Config, context: &PageContext) -> EffectiveConfig {
    let mut config = raw.clone();
    let overrides = config.remove(CONTEXT_OVERRIDES_KEY);
    let mut visible = true;

    let Some(Value::Array(entries)) = overrides else {
        return EffectiveConfig { config, visible };
    };

    for entry in entries {
        let rule: ContextOverride = match serde_json::from_value(entry) {
            Ok(rule) => rule,
            Err(e) => {
                debug!("Ignoring malformed context override: {}", e);
                continue;
            }
        };
        if !rule.matches(context) {
            continue;
        }
        match rule.effect {
            ContextEffect::Config {
                config_property,
                config_value,
            } => {
                config.insert(config_property, config_value);
            }
            ContextEffect::Visibility { visible: shown } => visible = shown,
        }
    }

    EffectiveConfig { config, visible }
}

/// Reads the value at a dot-separated path. `None` for an empty path, a
/// missing key, or a path through a non-object.
pub fn get_context_value<'c>(context: &'c PageContext, path: &str) -> Option<&'c Value> {
    if path.trim().is_empty() {
        return None;
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = context.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Writes `value` at a dot-separated path, creating (or replacing
/// non-object) intermediate values. Empty paths are ignored.
pub fn set_context_value(context: &mut PageContext, path: &str, value: Value) {
    let segments: Vec<&str> = path
        .trim()
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = context;
    for segment in parents {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

/// Returns true if a value exists at `path`.
#[must_use]
pub fn has_context_value(context: &PageContext, path: &str) -> bool {
    get_context_value(context, path).is_some()
}

fn loosen(value: &Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => value.clone(),
    }
}
