// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Declarative HTML extraction
//!
//! A [`HtmlRuleSet`] names an optional item selector (one record per match,
//! or one record for the whole page), an optional card selector (closest
//! ancestor-or-self of the item) and a list of [`FieldRule`]s. Each field
//! tries its [`Candidate`]s in order; the first candidate yielding any value
//! wins.
//!
//! Rule sets are plain data. [`HtmlExtractor`] compiles one once, parsing
//! every selector and pattern up front, and then interprets it against
//! page bodies.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{Record, RuleError};
use crate::source::types::ExtractionError;
use crate::utils::{collapse_whitespace, dedupe_by};

/// Which node a candidate selector is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The matched item (or the document root when there is no item selector)
    #[default]
    Item,
    /// The item's card; yields nothing when the item has no card
    Card,
    /// The whole document
    Document,
}

/// How a value is read from a matched node
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSource {
    /// Concatenated descendant text
    #[default]
    Text,
    /// First non-empty attribute among `names`
    Attr { names: Vec<String> },
    /// The text node immediately following the node
    NextText,
}

/// One way of finding a field value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub scope: Scope,
    /// Descendant selector; `None` reads the scope node itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Only nodes whose text contains this literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(default)]
    pub source: ValueSource,
}

impl Candidate {
    pub fn text(scope: Scope, selector: Option<&str>) -> Self {
        Self {
            scope,
            selector: selector.map(str::to_string),
            contains: None,
            source: ValueSource::Text,
        }
    }

    pub fn attr(scope: Scope, selector: Option<&str>, names: &[&str]) -> Self {
        Self {
            scope,
            selector: selector.map(str::to_string),
            contains: None,
            source: ValueSource::Attr {
                names: names.iter().map(|n| n.to_string()).collect(),
            },
        }
    }

    pub fn next_text(scope: Scope, selector: &str, contains: &str) -> Self {
        Self {
            scope,
            selector: Some(selector.to_string()),
            contains: Some(contains.to_string()),
            source: ValueSource::NextText,
        }
    }
}

/// Declarative specification of one record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub candidates: Vec<Candidate>,
    /// A record missing this field is rejected
    #[serde(default)]
    pub required: bool,
    /// Substituted when no candidate yields a value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Keep every distinct value instead of the first
    #[serde(default)]
    pub multiple: bool,
    /// Keep the last value instead of the first (single-valued fields)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub last: bool,
    /// Literals removed from each value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strip: Vec<String>,
    /// Values matching this pattern are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject: Option<String>,
    /// Each value is replaced by every match of this pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    /// Resolve values as URLs against the page URL
    #[serde(default)]
    pub absolute: bool,
}

impl FieldRule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            candidates: Vec::new(),
            required: false,
            default: None,
            multiple: false,
            last: false,
            strip: Vec::new(),
            reject: None,
            capture: None,
            absolute: false,
        }
    }

    pub fn from(mut self, candidate: Candidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }

    pub fn strip(mut self, literal: &str) -> Self {
        self.strip.push(literal.to_string());
        self
    }

    pub fn reject(mut self, pattern: &str) -> Self {
        self.reject = Some(pattern.to_string());
        self
    }

    pub fn capture(mut self, pattern: &str) -> Self {
        self.capture = Some(pattern.to_string());
        self
    }

    pub fn absolute(mut self) -> Self {
        self.absolute = true;
        self
    }
}

/// Rule table for one HTML resource type
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HtmlRuleSet {
    /// One record per match; `None` makes the page a single record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Closest ancestor-or-self of the item used for `Scope::Card`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldRule>,
}

struct CompiledCandidate {
    scope: Scope,
    selector: Option<Selector>,
    contains: Option<String>,
    source: ValueSource,
}

struct CompiledField {
    name: String,
    candidates: Vec<CompiledCandidate>,
    required: bool,
    default: Option<String>,
    multiple: bool,
    last: bool,
    strip: Vec<String>,
    reject: Option<Regex>,
    capture: Option<Regex>,
    absolute: bool,
}

/// Compiled, reusable interpreter for a [`HtmlRuleSet`]
pub struct HtmlExtractor {
    item: Option<Selector>,
    card: Option<Selector>,
    fields: Vec<CompiledField>,
}

impl std::fmt::Debug for HtmlExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlExtractor")
            .field("fields", &self.fields.iter().map(|c| c.name.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

pub(crate) fn parse_selector(raw: &str) -> Result<Selector, RuleError> {
    Selector::parse(raw).map_err(|e| RuleError::InvalidSelector {
        selector: raw.to_string(),
        reason: format!("{e:?}"),
    })
}

pub(crate) fn parse_pattern(raw: &str) -> Result<Regex, RuleError> {
    Regex::new(raw).map_err(|e| RuleError::InvalidPattern {
        pattern: raw.to_string(),
        reason: e.to_string(),
    })
}

impl HtmlExtractor {
    /// Compile a rule set, rejecting invalid selectors and patterns
    pub fn compile(rules: &HtmlRuleSet) -> Result<Self, RuleError> {
        let item = rules.item.as_deref().map(parse_selector).transpose()?;
        let card = rules.card.as_deref().map(parse_selector).transpose()?;

        let mut fields = Vec::with_capacity(rules.fields.len());
        for rule in &rules.fields {
            if rule.candidates.is_empty() && rule.default.is_none() {
                return Err(RuleError::EmptyField {
                    field: rule.name.clone(),
                });
            }

            let mut candidates = Vec::with_capacity(rule.candidates.len());
            for candidate in &rule.candidates {
                candidates.push(CompiledCandidate {
                    scope: candidate.scope,
                    selector: candidate.selector.as_deref().map(parse_selector).transpose()?,
                    contains: candidate.contains.clone(),
                    source: candidate.source.clone(),
                });
            }

            fields.push(CompiledField {
                name: rule.name.clone(),
                candidates,
                required: rule.required,
                default: rule.default.clone(),
                multiple: rule.multiple,
                last: rule.last,
                strip: rule.strip.clone(),
                reject: rule.reject.as_deref().map(parse_pattern).transpose()?,
                capture: rule.capture.as_deref().map(parse_pattern).transpose()?,
                absolute: rule.absolute,
            });
        }

        Ok(Self { item, card, fields })
    }

    /// Every record on the page; records missing a required field are skipped
    pub fn extract(&self, body: &str, page_url: &Url) -> Vec<Record> {
        let document = Html::parse_document(body);
        let root = document.root_element();

        let items: Vec<ElementRef> = match &self.item {
            Some(selector) => root.select(selector).collect(),
            None => vec![root],
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match self.record_for(item, root, page_url) {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping item: {}", e),
            }
        }
        records
    }

    /// The first record on the page
    pub fn extract_first(&self, body: &str, page_url: &Url) -> Result<Record, ExtractionError> {
        let document = Html::parse_document(body);
        let root = document.root_element();

        match &self.item {
            Some(selector) => {
                let mut last_error = None;
                for item in root.select(selector) {
                    match self.record_for(item, root, page_url) {
                        Ok(record) => return Ok(record),
                        Err(e) => last_error = Some(e),
                    }
                }
                Err(last_error.unwrap_or(ExtractionError::InvalidPayload {
                    reason: "no item matched".to_string(),
                }))
            }
            None => self.record_for(root, root, page_url),
        }
    }

    fn record_for(
        &self,
        item: ElementRef,
        root: ElementRef,
        page_url: &Url,
    ) -> Result<Record, ExtractionError> {
        let card = self.card.as_ref().and_then(|selector| closest(item, selector));
        let mut record = Record::default();

        for field in &self.fields {
            let mut values = Vec::new();
            for candidate in &field.candidates {
                let scope_node = match candidate.scope {
                    Scope::Item => Some(item),
                    Scope::Card => card,
                    Scope::Document => Some(root),
                };
                let Some(scope_node) = scope_node else {
                    continue;
                };

                values = field.refine(read_candidate(candidate, scope_node), page_url);
                if !values.is_empty() {
                    break;
                }
            }

            if values.is_empty() {
                if let Some(default) = &field.default {
                    values.push(default.clone());
                } else if field.required {
                    return Err(ExtractionError::MissingField {
                        field: field.name.clone(),
                    });
                }
            }

            if field.multiple {
                values = dedupe_by(values, |v| v.clone());
            } else if field.last {
                values = values.pop().into_iter().collect();
            } else {
                values.truncate(1);
            }
            record.insert(&field.name, values);
        }

        Ok(record)
    }
}

impl CompiledField {
    fn refine(&self, raw: Vec<String>, page_url: &Url) -> Vec<String> {
        let mut values = Vec::new();
        for mut value in raw {
            for literal in &self.strip {
                value = value.replace(literal.as_str(), "");
            }

            let pieces: Vec<String> = match &self.capture {
                Some(pattern) => pattern
                    .find_iter(&value)
                    .map(|m| m.as_str().to_string())
                    .collect(),
                None => vec![collapse_whitespace(&value)],
            };

            for piece in pieces {
                if piece.is_empty() {
                    continue;
                }
                if self.reject.as_ref().is_some_and(|r| r.is_match(&piece)) {
                    continue;
                }
                let piece = if self.absolute {
                    page_url
                        .join(&piece)
                        .map(|u| u.to_string())
                        .unwrap_or(piece)
                } else {
                    piece
                };
                values.push(piece);
            }
        }
        values
    }
}

fn read_candidate(candidate: &CompiledCandidate, scope_node: ElementRef) -> Vec<String> {
    let nodes: Vec<ElementRef> = match &candidate.selector {
        Some(selector) => scope_node.select(selector).collect(),
        None => vec![scope_node],
    };

    nodes
        .into_iter()
        .filter(|node| match &candidate.contains {
            Some(literal) => node.text().collect::<String>().contains(literal.as_str()),
            None => true,
        })
        .filter_map(|node| read_value(&candidate.source, node))
        .collect()
}

fn read_value(source: &ValueSource, node: ElementRef) -> Option<String> {
    match source {
        ValueSource::Text => Some(node.text().collect::<String>()),
        ValueSource::Attr { names } => names
            .iter()
            .filter_map(|name| node.value().attr(name))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string),
        ValueSource::NextText => node
            .next_sibling()
            .and_then(|sibling| sibling.value().as_text().map(|t| String::from(&**t))),
    }
}

fn closest<'a>(item: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    std::iter::successors(Some(item), |el| el.parent().and_then(ElementRef::wrap))
        .find(|el| selector.matches(el))
}
