// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use animefire_addon::source::rules::{defaults, ExtractionRules, RuleError};
use animefire_addon::source::{ListingKind, SourceConfig};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::common::*;

fn write_rules(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const CATALOG_OVERRIDE: &str = r#"
[catalog]
item = "li.anime > a"

[[catalog.fields]]
name = "url"
required = true
absolute = true

[[catalog.fields.candidates]]
scope = "item"
source = { kind = "attr", names = ["href"] }

[[catalog.fields]]
name = "title"
required = true

[[catalog.fields.candidates]]
scope = "item"
source = { kind = "attr", names = ["title"] }
"#;

#[test]
fn test_override_replaces_only_named_table() {
    let file = write_rules(CATALOG_OVERRIDE);
    let rules = ExtractionRules::load(file.path()).unwrap();

    assert_eq!(rules.catalog.item.as_deref(), Some("li.anime > a"));
    assert_eq!(rules.catalog.fields.len(), 2);
    assert_eq!(rules.meta, defaults::meta());
    assert_eq!(rules.episodes, defaults::episodes());
    assert_eq!(rules.streams, defaults::streams());
    assert_eq!(rules.legacy_streams, defaults::legacy_streams());
}

#[tokio::test]
async fn test_layout_change_is_a_data_change() {
    let file = write_rules(CATALOG_OVERRIDE);
    let rules = ExtractionRules::load(file.path()).unwrap();

    let body = r#"<ul>
        <li class="anime"><a href="/animes/frieren" title="Sousou no Frieren">img</a></li>
        <li class="anime"><a href="/animes/dandadan" title="Dandadan">img</a></li>
    </ul>"#;
    let fetcher = Arc::new(MockFetcher::new().with_page(&releases_url(), body));
    let service = animefire_addon::source::AddonService::with_fetcher(
        config(),
        &rules,
        fetcher.clone(),
        clock(),
    )
    .unwrap();

    let metas = service.catalog(ListingKind::Releases, None).await;
    let titles: Vec<_> = metas.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Sousou no Frieren", "Dandadan"]);
    assert!(metas.iter().all(|m| m.poster_url.is_none()));
}

#[test]
fn test_invalid_selector_rejected_at_load() {
    let file = write_rules("[episodes]\nitem = \"a.lEp[\"\n");
    assert!(matches!(
        ExtractionRules::load(file.path()),
        Err(RuleError::InvalidSelector { .. })
    ));
}

#[test]
fn test_invalid_pattern_rejected_at_load() {
    let raw = r#"
[legacy_streams]

[[legacy_streams.fields]]
name = "script_urls"
capture = "https?://(["
multiple = true

[[legacy_streams.fields.candidates]]
scope = "document"
selector = "script"
"#;
    let file = write_rules(raw);
    assert!(matches!(
        ExtractionRules::load(file.path()),
        Err(RuleError::InvalidPattern { .. })
    ));
}

#[test]
fn test_missing_file_and_bad_toml() {
    assert!(matches!(
        ExtractionRules::load(std::path::Path::new("/nonexistent/rules.toml")),
        Err(RuleError::Io { .. })
    ));

    let file = write_rules("[catalog\nitem = 1");
    assert!(matches!(
        ExtractionRules::load(file.path()),
        Err(RuleError::Parse(_))
    ));
}

#[test]
fn test_rules_path_from_config() {
    let file = write_rules(CATALOG_OVERRIDE);
    let config = SourceConfig {
        rules_path: Some(file.path().to_path_buf()),
        ..SourceConfig::default()
    };
    let rules = ExtractionRules::resolve(config.rules_path.as_deref()).unwrap();
    assert_eq!(rules.catalog.item.as_deref(), Some("li.anime > a"));

    assert_eq!(ExtractionRules::resolve(None).unwrap(), ExtractionRules::default());
}

#[test]
fn test_dumped_defaults_reload() {
    let dumped = ExtractionRules::default().to_toml_string().unwrap();
    let file = write_rules(&dumped);
    assert_eq!(
        ExtractionRules::load(file.path()).unwrap(),
        ExtractionRules::default()
    );
}
