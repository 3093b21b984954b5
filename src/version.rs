// Version information for the AnimeFire addon

/// Addon id advertised in the manifest
pub const ADDON_ID: &str = "org.animefire.complete";

/// Addon display name
pub const ADDON_NAME: &str = "AnimeFire Hub";

/// Addon description shown by clients
pub const ADDON_DESCRIPTION: &str =
    "Addon Brasileiro de Animes. Assista lançamentos em HD direto do AnimeFire.io.";

/// Logo shown by clients
pub const ADDON_LOGO: &str = "https://animefire.io/img/logo.png";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.3.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 1;

/// Minor version number
pub const VERSION_MINOR: u32 = 3;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "catalog-releases",
    "catalog-search",
    "meta-dual-url",
    "structured-streams",
    "legacy-html-streams",
    "ttl-cache",
    "rules-file",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {} ({})", ADDON_NAME, VERSION_NUMBER, ADDON_ID)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "id": ADDON_ID,
        "version": VERSION_NUMBER,
        "features": FEATURES,
    })
}
