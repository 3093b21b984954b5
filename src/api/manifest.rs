// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Addon manifest advertised at `/manifest.json`

use serde::Serialize;

use crate::source::ids::CONTENT_ID_PREFIX;
use crate::source::types::{ContentKind, ListingKind};
use crate::version::{ADDON_DESCRIPTION, ADDON_ID, ADDON_LOGO, ADDON_NAME, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtra {
    pub name: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManifestCatalog {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ManifestExtra>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub catalogs: Vec<ManifestCatalog>,
    pub resources: Vec<String>,
    pub types: Vec<ContentKind>,
    pub id_prefixes: Vec<String>,
}

impl Manifest {
    pub fn build() -> Self {
        Self {
            id: ADDON_ID.to_string(),
            version: VERSION_NUMBER.to_string(),
            name: ADDON_NAME.to_string(),
            description: ADDON_DESCRIPTION.to_string(),
            logo: ADDON_LOGO.to_string(),
            catalogs: vec![
                ManifestCatalog {
                    kind: ContentKind::Anime,
                    id: ListingKind::Releases.catalog_id().to_string(),
                    name: "AnimeFire: Lançamentos".to_string(),
                    extra: Vec::new(),
                },
                ManifestCatalog {
                    kind: ContentKind::Anime,
                    id: ListingKind::Search.catalog_id().to_string(),
                    name: "AnimeFire: Busca".to_string(),
                    extra: vec![ManifestExtra {
                        name: "search".to_string(),
                        is_required: true,
                    }],
                },
            ],
            resources: ["catalog", "meta", "stream"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            types: vec![ContentKind::Anime, ContentKind::Series, ContentKind::Movie],
            id_prefixes: vec![CONTENT_ID_PREFIX.to_string()],
        }
    }

    /// Whether a catalog of this type and id is advertised
    pub fn has_catalog(&self, kind: ContentKind, id: &str) -> bool {
        self.catalogs.iter().any(|c| c.kind == kind && c.id == id)
    }
}
