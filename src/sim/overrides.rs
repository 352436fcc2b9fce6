//! Named attribute overrides
//!
//! Scenario authoring tools change animals by attribute name (`speed`,
//! `color`, `shape`, `eats`). Names are mapped to typed variants through a
//! fixed table, so an unknown name is rejected before anything is touched.

use serde::{Deserialize, Serialize};

use crate::consts::{SPEED_FAST, SPEED_MEDIUM, SPEED_SLOW};
use crate::error::{Result, SimError};

/// A single typed attribute change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "lowercase")]
pub enum AttributeOverride {
    /// New speed cap
    Speed(f64),
    Color(String),
    Shape(String),
    /// Names of the animals to eat; replaces the current prey set
    Eats(Vec<String>),
}

type Parser = fn(&str) -> Result<AttributeOverride>;

const ATTRIBUTES: [(&str, Parser); 4] = [
    ("speed", parse_speed),
    ("eats", parse_eats),
    ("color", parse_color),
    ("shape", parse_shape),
];

impl AttributeOverride {
    /// Names accepted by [`AttributeOverride::parse`]
    pub fn attribute_names() -> impl Iterator<Item = &'static str> {
        ATTRIBUTES.iter().map(|(name, _)| *name)
    }

    /// Build an override from an attribute name and its raw value
    pub fn parse(attribute: &str, value: &str) -> Result<Self> {
        let Some((_, parser)) = ATTRIBUTES.iter().find(|(name, _)| *name == attribute) else {
            let expected: Vec<_> = Self::attribute_names().collect();
            return Err(SimError::InvalidSyntax(format!(
                "Expected one of {expected:?}, instead got '{attribute}'"
            )));
        };
        parser(strip_braces(value))
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            AttributeOverride::Speed(_) => "speed",
            AttributeOverride::Color(_) => "color",
            AttributeOverride::Shape(_) => "shape",
            AttributeOverride::Eats(_) => "eats",
        }
    }
}

fn strip_braces(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value)
        .trim()
}

fn parse_speed(value: &str) -> Result<AttributeOverride> {
    let speed = match value {
        "slow" => SPEED_SLOW,
        "medium" => SPEED_MEDIUM,
        "fast" => SPEED_FAST,
        other => other
            .parse::<f64>()
            .ok()
            .filter(|s| s.is_finite() && *s >= 0.0)
            .ok_or_else(|| SimError::InvalidSyntax(format!("'{other}' is not a speed")))?,
    };
    Ok(AttributeOverride::Speed(speed))
}

fn parse_eats(value: &str) -> Result<AttributeOverride> {
    let names: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    Ok(AttributeOverride::Eats(names))
}

fn parse_color(value: &str) -> Result<AttributeOverride> {
    non_empty(value, "color").map(AttributeOverride::Color)
}

fn parse_shape(value: &str) -> Result<AttributeOverride> {
    non_empty(value, "shape").map(AttributeOverride::Shape)
}

fn non_empty(value: &str, attribute: &str) -> Result<String> {
    if value.is_empty() {
        Err(SimError::InvalidSyntax(format!("{attribute} needs a value")))
    } else {
        Ok(value.to_string())
    }
}
