// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Built-in rule tables for the AnimeFire layout

use super::html::{Candidate, FieldRule, HtmlRuleSet, Scope};
use super::json::{JsonFieldRule, JsonRuleSet};

/// Genre tokens that are really rating badges, e.g. `A14`
pub const BADGE_PATTERN: &str = r"^[A-Z]\d+$";

/// Direct video links embedded in player scripts
pub const SCRIPT_VIDEO_PATTERN: &str = r#"https?://[^"'\s]+\.mp4"#;

/// Content links on listing pages, one record per link
pub fn catalog() -> HtmlRuleSet {
    HtmlRuleSet {
        item: Some("a[href*='/animes/']".to_string()),
        card: Some("article, .cardUltimosEps, div[class*='col']".to_string()),
        fields: vec![
            FieldRule::new("url")
                .from(Candidate::attr(Scope::Item, None, &["href"]))
                .required()
                .absolute(),
            FieldRule::new("title")
                .from(Candidate::text(Scope::Card, Some(".animeTitle, h3")))
                .from(Candidate::text(Scope::Item, None))
                .required(),
            FieldRule::new("poster")
                .from(Candidate::attr(Scope::Card, Some("img"), &["data-src", "src"]))
                .from(Candidate::attr(Scope::Item, Some("img"), &["data-src", "src"]))
                .absolute(),
        ],
    }
}

/// Detail fields of a content page
pub fn meta() -> HtmlRuleSet {
    HtmlRuleSet {
        item: None,
        card: None,
        fields: vec![
            FieldRule::new("title")
                .from(Candidate::text(Scope::Document, Some(".div_anime_names .quicksand400")))
                .from(Candidate::text(Scope::Document, Some("h1"))),
            FieldRule::new("poster")
                .from(Candidate::attr(
                    Scope::Document,
                    Some(".sub_anime_page_img img"),
                    &["data-src", "src"],
                ))
                .absolute(),
            FieldRule::new("description")
                .from(Candidate::text(Scope::Document, Some(".divSinopse")))
                .strip("Sinopse:")
                .default_value(""),
            FieldRule::new("year")
                .from(Candidate::next_text(Scope::Document, ".animeInfo span", "Ano:"))
                .last()
                .default_value("N/A"),
            FieldRule::new("genres")
                .from(Candidate::text(Scope::Document, Some(".spanGeneros, .spanGenerosLink")))
                .reject(BADGE_PATTERN)
                .multiple(),
        ],
    }
}

/// Episode links of a content page, in page order
pub fn episodes() -> HtmlRuleSet {
    HtmlRuleSet {
        item: Some("a.lEp, .div_video_list a".to_string()),
        card: None,
        fields: vec![
            FieldRule::new("url")
                .from(Candidate::attr(Scope::Item, None, &["href"]))
                .required(),
            FieldRule::new("label").from(Candidate::text(Scope::Item, None)),
        ],
    }
}

/// Playback-data endpoint, `{ data: [ { src, label } ] }`
pub fn streams() -> JsonRuleSet {
    JsonRuleSet {
        items: "data".to_string(),
        fields: vec![
            JsonFieldRule::new("url", "src").required(),
            JsonFieldRule::new("label", "label").default_value("HD"),
        ],
    }
}

/// Older player page: script links, the HTML5 player, download links
pub fn legacy_streams() -> HtmlRuleSet {
    HtmlRuleSet {
        item: None,
        card: None,
        fields: vec![
            FieldRule::new("script_urls")
                .from(Candidate::text(Scope::Document, Some("script")))
                .capture(SCRIPT_VIDEO_PATTERN)
                .multiple(),
            FieldRule::new("player_url")
                .from(Candidate::attr(Scope::Document, Some("video"), &["data-video-src"]))
                .from(Candidate::attr(Scope::Document, Some("video source"), &["src"]))
                .absolute(),
            FieldRule::new("download_urls")
                .from(Candidate::attr(
                    Scope::Document,
                    Some("a.download-button, a[href$='.mp4']"),
                    &["href"],
                ))
                .multiple()
                .absolute(),
        ],
    }
}
