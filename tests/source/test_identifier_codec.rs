// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use animefire_addon::source::ids::{canonical_slug, ContentId, EpisodeId, IdentifierError};
use animefire_addon::utils::last_segment;

const PATHS: &[&str] = &[
    "https://animefire.io/animes/one-piece-todos-os-episodios",
    "https://animefire.io/animes/naruto-shippuden/",
    "/animes/boku-no-hero-academia-7",
    "animes//jujutsu-kaisen",
    "kimetsu-no-yaiba",
    "https://animefire.io/animes/af_spy-x-family",
];

#[test]
fn test_content_round_trip_law() {
    for path in PATHS {
        let id = ContentId::from_source_path(path).unwrap();
        let expected = last_segment(path).unwrap();
        let expected = expected.strip_prefix("af_").unwrap_or(expected);
        assert_eq!(id.slug(), expected, "path {path}");
        assert!(id.as_str().starts_with("af_"));
        assert!(!id.as_str()[3..].starts_with("af_"), "double prefix for {path}");
    }
}

#[test]
fn test_empty_path_is_invalid() {
    for path in ["", "/", "///"] {
        assert!(matches!(
            ContentId::from_source_path(path),
            Err(IdentifierError::EmptySlug { .. })
        ));
    }
}

#[test]
fn test_episode_round_trip_law() {
    let content = ContentId::parse("af_one-piece").unwrap();
    for token in ["1", "1100", "especial-1", "ova", ""] {
        let id = EpisodeId::new(&content, token).unwrap();
        let (decoded_content, decoded_token) = EpisodeId::decode(id.as_str()).unwrap();
        assert_eq!(decoded_content, content);
        assert_eq!(decoded_token, token);
    }
}

#[test]
fn test_episode_token_with_delimiter_rejected() {
    let content = ContentId::parse("af_one-piece").unwrap();
    assert!(EpisodeId::new(&content, "12:extra").is_err());
}

#[test]
fn test_suffix_stripping_equivalence() {
    let from_catalog = ContentId::from_source_path("/animes/one-piece-todos-os-episodios").unwrap();
    let hand_built = ContentId::parse("af_one-piece").unwrap();

    assert_ne!(from_catalog, hand_built);
    assert_eq!(from_catalog.canonical_slug(), hand_built.canonical_slug());
    assert_eq!(canonical_slug(canonical_slug("one-piece-todos-os-episodios")), "one-piece");
}

#[test]
fn test_serializes_as_plain_string() {
    let id = ContentId::parse("af_bleach").unwrap();
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"af_bleach\"");

    let episode = EpisodeId::new(&id, "3").unwrap();
    assert_eq!(serde_json::to_string(&episode).unwrap(), "\"af_bleach:3\"");
}
