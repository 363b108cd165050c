//! Runtime configuration
//!
//! [`ShapingConfig`] carries the knobs that change shaping output or policy:
//! how many pixels a point covers, what to do when a face declares no
//! features, and how large the segment cache may grow. Defaults suit most
//! callers; [`ShapingConfig::from_env`] lets deployments override them.
//!
//! Caching is a separate global switch. **It is disabled by default** and is
//! turned on via [`set_caching_enabled`] or the `GLYPHWEAVE_CACHE=1`
//! environment variable.
//!
//! ```
//! use glyphweave_core::config;
//!
//! config::set_caching_enabled(true);
//! assert!(config::is_caching_enabled());
//! config::set_caching_enabled(false);
//! ```
//!
//! # Environment variables
//!
//! | Variable | Meaning |
//! |---|---|
//! | `GLYPHWEAVE_CACHE` | `1`/`true`/`yes`/`on` enables the segment cache |
//! | `GLYPHWEAVE_PIXELS_PER_POINT` | positive float, default `1.0` |
//! | `GLYPHWEAVE_LANGUAGE_FALLBACK` | `empty` (default) or `strict` |
//! | `GLYPHWEAVE_CACHE_CAPACITY` | segments kept by the cache, default `512` |

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::error::{GlyphweaveError, Result};

/// Global flag for whether caching is enabled (disabled by default)
static CACHING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Whether the env var has been checked
static ENV_CHECKED: OnceLock<()> = OnceLock::new();

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn check_env() {
    ENV_CHECKED.get_or_init(|| {
        if let Ok(val) = std::env::var("GLYPHWEAVE_CACHE") {
            if is_truthy(&val) {
                CACHING_ENABLED.store(true, Ordering::SeqCst);
                log::info!("Glyphweave caching enabled via GLYPHWEAVE_CACHE env var");
            }
        }
    });
}

/// Check if caching is globally enabled
///
/// Reads `GLYPHWEAVE_CACHE` on first call; later runtime changes via
/// [`set_caching_enabled`] take precedence.
pub fn is_caching_enabled() -> bool {
    check_env();
    CACHING_ENABLED.load(Ordering::SeqCst)
}

/// Enable or disable caching globally at runtime
pub fn set_caching_enabled(enabled: bool) {
    check_env();
    CACHING_ENABLED.store(enabled, Ordering::SeqCst);
    log::debug!(
        "Glyphweave caching {} via runtime call",
        if enabled { "enabled" } else { "disabled" }
    );
}

/// What deriving feature settings does when a face declares no features
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguageFallback {
    /// Return empty settings and report a diagnostic
    #[default]
    Empty,
    /// Fail with `UnsupportedLanguage`
    Strict,
}

impl FromStr for LanguageFallback {
    type Err = GlyphweaveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "empty" => Ok(LanguageFallback::Empty),
            "strict" => Ok(LanguageFallback::Strict),
            other => Err(GlyphweaveError::Config(format!(
                "unknown language fallback policy {other:?}"
            ))),
        }
    }
}

/// Default number of segments the shaping cache keeps
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Shaping configuration shared by fonts and shapers
#[derive(Debug, Clone, PartialEq)]
pub struct ShapingConfig {
    /// Device pixels per typographic point
    pub pixels_per_point: f32,
    /// Policy for faces without any declared feature
    pub language_fallback: LanguageFallback,
    /// Maximum segments held by the shaping cache
    pub cache_capacity: usize,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            pixels_per_point: 1.0,
            language_fallback: LanguageFallback::Empty,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl ShapingConfig {
    /// Defaults overridden by `GLYPHWEAVE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("GLYPHWEAVE_PIXELS_PER_POINT") {
            config.pixels_per_point = raw.trim().parse().map_err(|_| {
                GlyphweaveError::Config(format!("GLYPHWEAVE_PIXELS_PER_POINT: {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup("GLYPHWEAVE_LANGUAGE_FALLBACK") {
            config.language_fallback = raw.parse()?;
        }
        if let Some(raw) = lookup("GLYPHWEAVE_CACHE_CAPACITY") {
            config.cache_capacity = raw.trim().parse().map_err(|_| {
                GlyphweaveError::Config(format!("GLYPHWEAVE_CACHE_CAPACITY: {raw:?}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.pixels_per_point.is_finite() || self.pixels_per_point <= 0.0 {
            return Err(GlyphweaveError::Config(format!(
                "pixels per point must be positive, got {}",
                self.pixels_per_point
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_enable_disable() {
        set_caching_enabled(true);
        assert!(is_caching_enabled());

        set_caching_enabled(false);
        assert!(!is_caching_enabled());
    }

    #[test]
    fn defaults_without_overrides() {
        let config = ShapingConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ShapingConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ShapingConfig::from_lookup(lookup_from(&[
            ("GLYPHWEAVE_PIXELS_PER_POINT", "1.5"),
            ("GLYPHWEAVE_LANGUAGE_FALLBACK", "Strict"),
            ("GLYPHWEAVE_CACHE_CAPACITY", "16"),
        ]))
        .unwrap();
        assert_eq!(config.pixels_per_point, 1.5);
        assert_eq!(config.language_fallback, LanguageFallback::Strict);
        assert_eq!(config.cache_capacity, 16);
    }

    #[test]
    fn bad_values_are_config_errors() {
        let err = ShapingConfig::from_lookup(lookup_from(&[(
            "GLYPHWEAVE_PIXELS_PER_POINT",
            "-2",
        )]))
        .unwrap_err();
        assert!(matches!(err, GlyphweaveError::Config(_)));

        let err = ShapingConfig::from_lookup(lookup_from(&[(
            "GLYPHWEAVE_LANGUAGE_FALLBACK",
            "maybe",
        )]))
        .unwrap_err();
        assert!(matches!(err, GlyphweaveError::Config(_)));
    }
}
