// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction rules
//!
//! Site layout lives here as data: one rule table per resource type,
//! interpreted by the generic [`HtmlExtractor`] / [`JsonExtractor`]. The
//! built-in tables can be overridden table-by-table from a TOML file.

pub mod defaults;
pub mod html;
pub mod json;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub use html::{Candidate, FieldRule, HtmlExtractor, HtmlRuleSet, Scope, ValueSource};
pub use json::{JsonExtractor, JsonFieldRule, JsonRuleSet};

/// Invalid rule tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("field '{field}' has no way to produce a value")]
    EmptyField { field: String },

    #[error("failed to read rules file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse rules: {0}")]
    Parse(String),
}

/// Field values extracted for one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: HashMap<String, Vec<String>>,
}

impl Record {
    pub fn insert(&mut self, name: &str, values: Vec<String>) {
        self.values.insert(name.to_string(), values);
    }

    /// First value of a field
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Every value of a field, empty when absent
    pub fn all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Every rule table the resolvers consume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Listing page → one record per content link
    pub catalog: HtmlRuleSet,
    /// Content page → one record of detail fields
    pub meta: HtmlRuleSet,
    /// Content page → one record per episode link
    pub episodes: HtmlRuleSet,
    /// Playback-data JSON → one record per source
    pub streams: JsonRuleSet,
    /// Older player page → script, player and download links
    pub legacy_streams: HtmlRuleSet,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            catalog: defaults::catalog(),
            meta: defaults::meta(),
            episodes: defaults::episodes(),
            streams: defaults::streams(),
            legacy_streams: defaults::legacy_streams(),
        }
    }
}

impl ExtractionRules {
    /// Parse TOML; tables absent from the input keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self, RuleError> {
        let rules: Self = toml::from_str(raw).map_err(|e| RuleError::Parse(e.to_string()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load and validate a rules file
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let raw = std::fs::read_to_string(path).map_err(|e| RuleError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, or the file at `path` when one is configured
    pub fn resolve(path: Option<&Path>) -> Result<Self, RuleError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, RuleError> {
        toml::to_string_pretty(self).map_err(|e| RuleError::Parse(e.to_string()))
    }

    /// Compile every table, surfacing the first invalid selector or pattern
    pub fn validate(&self) -> Result<(), RuleError> {
        HtmlExtractor::compile(&self.catalog)?;
        HtmlExtractor::compile(&self.meta)?;
        HtmlExtractor::compile(&self.episodes)?;
        JsonExtractor::compile(&self.streams)?;
        HtmlExtractor::compile(&self.legacy_streams)?;
        Ok(())
    }
}
