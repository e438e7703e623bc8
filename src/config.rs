//! Engine configuration.
//!
//! Loaded from camelCase JSON with every field defaulted, then optionally
//! overridden from the environment:
//!
//! - `LIQUID_ICON_BACKEND`: `auto`, `cpu`, or `gpu`
//! - `LIQUID_ICON_EXPORT_SIZE`: positive integer edge length in pixels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::DEFAULT_SVG_RASTER_SIZE;
use crate::error::ConfigError;

pub const BACKEND_ENV: &str = "LIQUID_ICON_BACKEND";
pub const EXPORT_SIZE_ENV: &str = "LIQUID_ICON_EXPORT_SIZE";

/// Which glass backend the engine should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Probe for a GPU and fall back to the CPU.
    #[default]
    Auto,
    Cpu,
    Gpu,
}

impl FromStr for BackendPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub backend: BackendPreference,
    /// Edge length for interactive preview frames.
    pub preview_size: u32,
    /// Edge length for exported frames.
    pub export_size: u32,
    /// Edge length SVG assets are rasterized at before caching.
    pub svg_raster_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            preview_size: 512,
            export_size: 1024,
            svg_raster_size: DEFAULT_SVG_RASTER_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Applies `LIQUID_ICON_BACKEND` and `LIQUID_ICON_EXPORT_SIZE` if set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(BACKEND_ENV) {
            self.backend = value.parse()?;
            debug!(backend = %self.backend, "backend overridden from environment");
        }
        if let Some(value) = lookup(EXPORT_SIZE_ENV) {
            self.export_size = parse_size(EXPORT_SIZE_ENV, &value)?;
            debug!(export_size = self.export_size, "export size overridden from environment");
        }
        Ok(self)
    }
}

fn parse_size(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.preview_size, 512);
        assert_eq!(config.export_size, 1024);
        assert_eq!(config.backend, BackendPreference::Auto);
    }

    #[test]
    fn json_is_camel_case() {
        let config = EngineConfig::from_json(r#"{"backend":"cpu","exportSize":256}"#).unwrap();
        assert_eq!(config.backend, BackendPreference::Cpu);
        assert_eq!(config.export_size, 256);
        assert_eq!(config.preview_size, 512);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"svgRasterSize\""));
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"backend":"metal"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("GPU".parse::<BackendPreference>().unwrap(), BackendPreference::Gpu);
        assert_eq!(" cpu ".parse::<BackendPreference>().unwrap(), BackendPreference::Cpu);
        assert!(matches!(
            "vulkan".parse::<BackendPreference>(),
            Err(ConfigError::UnknownBackend(name)) if name == "vulkan"
        ));
    }

    #[test]
    fn overrides_apply_when_present() {
        let config = EngineConfig::default()
            .with_overrides(env(&[(BACKEND_ENV, "cpu"), (EXPORT_SIZE_ENV, "2048")]))
            .unwrap();
        assert_eq!(config.backend, BackendPreference::Cpu);
        assert_eq!(config.export_size, 2048);

        let untouched = EngineConfig::default().with_overrides(env(&[])).unwrap();
        assert_eq!(untouched, EngineConfig::default());
    }

    #[test]
    fn bad_overrides_are_rejected() {
        for bad in ["0", "-4", "big"] {
            let err = EngineConfig::default()
                .with_overrides(env(&[(EXPORT_SIZE_ENV, bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { name: EXPORT_SIZE_ENV, .. }));
        }
        assert!(EngineConfig::default()
            .with_overrides(env(&[(BACKEND_ENV, "opengl")]))
            .is_err());
    }
}
