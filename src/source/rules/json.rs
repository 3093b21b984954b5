// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Declarative JSON extraction by dotted key paths

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Record, RuleError};
use crate::source::types::ExtractionError;

/// One field read from each item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFieldRule {
    pub name: String,
    /// Dotted path relative to the item
    pub path: String,
    #[serde(default)]
    pub required: bool,
    /// Used when the value is absent, null or an empty string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl JsonFieldRule {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }
}

/// Rule table for a JSON payload holding an array of items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JsonRuleSet {
    /// Dotted path to the item array
    pub items: String,
    #[serde(default)]
    pub fields: Vec<JsonFieldRule>,
}

/// Interpreter for a [`JsonRuleSet`]
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    items: Vec<String>,
    fields: Vec<(JsonFieldRule, Vec<String>)>,
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
        _ => None,
    })
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl JsonExtractor {
    pub fn compile(rules: &JsonRuleSet) -> Result<Self, RuleError> {
        let mut fields = Vec::with_capacity(rules.fields.len());
        for field in &rules.fields {
            let path = split_path(&field.path);
            if path.is_empty() {
                return Err(RuleError::EmptyField {
                    field: field.name.clone(),
                });
            }
            fields.push((field.clone(), path));
        }

        Ok(Self {
            items: split_path(&rules.items),
            fields,
        })
    }

    /// Records for every item in the payload
    ///
    /// A payload without the item array yields no records; one that is not
    /// JSON, or whose item path is not an array, is an error. Items missing
    /// a required field are skipped.
    pub fn extract(&self, body: &str) -> Result<Vec<Record>, ExtractionError> {
        let payload: Value =
            serde_json::from_str(body).map_err(|e| ExtractionError::InvalidPayload {
                reason: e.to_string(),
            })?;

        let items = match lookup(&payload, &self.items) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ExtractionError::InvalidPayload {
                    reason: format!("'{}' is not an array", self.items.join(".")),
                })
            }
        };

        let mut records = Vec::with_capacity(items.len());
        'items: for item in items {
            let mut record = Record::default();
            for (rule, path) in &self.fields {
                let value = lookup(item, path)
                    .and_then(scalar)
                    .or_else(|| rule.default.clone());
                match value {
                    Some(value) => record.insert(&rule.name, vec![value]),
                    None if rule.required => continue 'items,
                    None => {}
                }
            }
            records.push(record);
        }
        Ok(records)
    }
}
