// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Small text and collection helpers shared by the resolvers

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first occurrence of each key, preserving order
pub fn dedupe_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// First run of ASCII digits in `text`, parsed as an integer
///
/// Returns `None` when there is no digit run or it overflows `u32`.
pub fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Last non-empty `/`-separated segment of a path or URL
pub fn last_segment(path: &str) -> Option<&str> {
    path.split('/').filter(|s| !s.is_empty()).last()
}

/// `href` without its query string and fragment
pub fn without_query(href: &str) -> &str {
    href.split(['?', '#']).next().unwrap_or(href)
}
