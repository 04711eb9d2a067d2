//! Configuration system

use serde::{Deserialize, Serialize};

use crate::platform::ShowState;
use crate::renderer::DeviceProfile;

/// Configuration trait: serde-backed types loadable from TOML or RON.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file, choosing the format by extension.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_owned()))
        }
    }

    /// Save configuration to file, choosing the format by extension.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_owned()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level bootstrap configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name reported to the graphics API
    pub app_name: String,
    /// Window creation parameters
    pub window: WindowConfig,
    /// Device suitability weights
    pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Ember".to_owned(),
            window: WindowConfig::default(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl Config for EngineConfig {}

/// Window creation parameters supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title-bar text
    pub title: String,
    /// Initial visibility
    pub show: ShowState,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Ember Engine".to_owned(),
            show: ShowState::default(),
        }
    }
}

/// Configurable device-suitability weights.
///
/// The defaults reproduce the reference policy; any of the weights may be
/// overridden to re-rank device classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Score for discrete GPUs
    pub discrete: u32,
    /// Score for integrated GPUs
    pub integrated: u32,
    /// Score for every other device class
    pub other: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            discrete: 50_000,
            integrated: 10_000,
            other: 0,
        }
    }
}

impl ScoringWeights {
    /// Suitability score for a device capability snapshot.
    pub fn score(&self, profile: &DeviceProfile) -> u32 {
        use ash::vk::PhysicalDeviceType;
        match profile.device_type {
            PhysicalDeviceType::DISCRETE_GPU => self.discrete,
            PhysicalDeviceType::INTEGRATED_GPU => self.integrated,
            _ => self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::selection::default_suitability;
    use ash::vk;

    fn profile(device_type: vk::PhysicalDeviceType) -> DeviceProfile {
        DeviceProfile {
            device_type,
            features: vk::PhysicalDeviceFeatures::default(),
            name: "mock".to_owned(),
        }
    }

    #[test]
    fn default_weights_match_the_reference_policy() {
        let weights = ScoringWeights::default();
        for device_type in [
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vk::PhysicalDeviceType::INTEGRATED_GPU,
            vk::PhysicalDeviceType::VIRTUAL_GPU,
            vk::PhysicalDeviceType::CPU,
        ] {
            let profile = profile(device_type);
            assert_eq!(weights.score(&profile), default_suitability(&profile));
        }
    }

    #[test]
    fn custom_weights_rerank_device_classes() {
        let weights = ScoringWeights {
            discrete: 1,
            integrated: 100,
            other: 0,
        };
        assert!(
            weights.score(&profile(vk::PhysicalDeviceType::INTEGRATED_GPU))
                > weights.score(&profile(vk::PhysicalDeviceType::DISCRETE_GPU))
        );
    }

    #[test]
    fn toml_round_trip_preserves_the_config() {
        let mut config = EngineConfig::default();
        config.app_name = "Demo".to_owned();
        config.scoring.discrete = 123;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.app_name, "Demo");
        assert_eq!(parsed.scoring.discrete, 123);
        assert_eq!(parsed.window.title, config.window.title);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: EngineConfig = toml::from_str("app_name = \"Partial\"").unwrap();
        assert_eq!(parsed.app_name, "Partial");
        assert_eq!(parsed.scoring, ScoringWeights::default());
    }
}
