//! Page URL query overrides

use std::str::FromStr;

/// Settings taken from the page URL, e.g. `?debug=false&log=debug`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlOverrides {
    /// Show or hide the debug panel
    pub debug: Option<bool>,
    /// Maximum log level
    pub log_level: Option<tracing::Level>,
}

impl UrlOverrides {
    /// Read overrides from the current page location
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Ok(href) = window.location().href() else {
            return Self::default();
        };
        let Ok(url) = web_sys::Url::new(&href) else {
            return Self::default();
        };

        let params = url.search_params();
        Self::from_pairs(
            ["debug", "log"]
                .into_iter()
                .filter_map(|key| params.get(key).map(|value| (key.to_string(), value))),
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }

    /// Build overrides from decoded query pairs; unknown keys and bad values are ignored
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "debug" => overrides.debug = parse_flag(&value),
                "log" => overrides.log_level = tracing::Level::from_str(&value).ok(),
                _ => {}
            }
        }
        overrides
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
