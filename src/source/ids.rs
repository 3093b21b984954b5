// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content and episode identifiers
//!
//! A content id is the site slug behind a fixed marker (`af_<slug>`). An
//! episode id appends an episode token after the `:` delimiter
//! (`af_<slug>:<token>`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::utils::last_segment;

/// Marker every content id starts with
pub const CONTENT_ID_PREFIX: &str = "af_";

/// Separates the content id from the episode token
pub const EPISODE_DELIMITER: char = ':';

/// Slug suffix the site uses for its "full episode listing" pages
pub const FULL_LISTING_SUFFIX: &str = "-todos-os-episodios";

/// Malformed identifier errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The source path has no non-empty segment
    #[error("no slug in source path '{path}'")]
    EmptySlug {
        /// The offending path
        path: String,
    },

    /// The slug would make the episode delimiter ambiguous
    #[error("slug '{slug}' contains the episode delimiter")]
    DelimiterInSlug {
        /// The offending slug
        slug: String,
    },

    /// The id does not carry the content marker
    #[error("'{id}' is not a content id")]
    NotContentId {
        /// The offending id
        id: String,
    },

    /// Episode token contains the delimiter
    #[error("episode token '{token}' contains the delimiter")]
    DelimiterInToken {
        /// The offending token
        token: String,
    },

    /// Episode id without a delimiter
    #[error("'{id}' is not an episode id")]
    NotEpisodeId {
        /// The offending id
        id: String,
    },
}

/// Opaque content identifier, `af_<slug>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Encode the last non-empty segment of a source path or URL
    ///
    /// A segment that already carries the marker is taken as-is, so an id
    /// never holds the marker twice.
    pub fn from_source_path(path: &str) -> Result<Self, IdentifierError> {
        let slug = last_segment(path).ok_or_else(|| IdentifierError::EmptySlug {
            path: path.to_string(),
        })?;
        let slug = slug.strip_prefix(CONTENT_ID_PREFIX).unwrap_or(slug);
        Self::from_slug(slug)
    }

    /// Build an id from a bare slug
    pub fn from_slug(slug: &str) -> Result<Self, IdentifierError> {
        if slug.is_empty() {
            return Err(IdentifierError::EmptySlug {
                path: slug.to_string(),
            });
        }
        if slug.contains(EPISODE_DELIMITER) {
            return Err(IdentifierError::DelimiterInSlug {
                slug: slug.to_string(),
            });
        }
        Ok(Self(format!("{CONTENT_ID_PREFIX}{slug}")))
    }

    /// Validate a raw id received from a client
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let slug = raw
            .strip_prefix(CONTENT_ID_PREFIX)
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| IdentifierError::NotContentId { id: raw.to_string() })?;
        Self::from_slug(slug)
    }

    /// The slug exactly as encoded
    pub fn slug(&self) -> &str {
        &self.0[CONTENT_ID_PREFIX.len()..]
    }

    /// The slug with the full-listing suffix removed
    ///
    /// Catalog-derived ids often carry the suffix while hand-built ones do
    /// not; both route to the same canonical slug.
    pub fn canonical_slug(&self) -> &str {
        canonical_slug(self.slug())
    }

    /// The id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip every trailing full-listing suffix (idempotent)
pub fn canonical_slug(slug: &str) -> &str {
    let mut current = slug;
    while let Some(stripped) = current.strip_suffix(FULL_LISTING_SUFFIX) {
        if stripped.is_empty() {
            break;
        }
        current = stripped;
    }
    current
}

/// Opaque episode identifier, `<content id>:<token>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(String);

impl EpisodeId {
    /// Join a content id and an episode token
    pub fn new(content: &ContentId, token: &str) -> Result<Self, IdentifierError> {
        if token.contains(EPISODE_DELIMITER) {
            return Err(IdentifierError::DelimiterInToken {
                token: token.to_string(),
            });
        }
        Ok(Self(format!("{content}{EPISODE_DELIMITER}{token}")))
    }

    /// Split a raw id on the first delimiter
    pub fn decode(raw: &str) -> Result<(ContentId, String), IdentifierError> {
        let (content, token) = raw
            .split_once(EPISODE_DELIMITER)
            .ok_or_else(|| IdentifierError::NotEpisodeId { id: raw.to_string() })?;
        Ok((ContentId::parse(content)?, token.to_string()))
    }

    /// The id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
