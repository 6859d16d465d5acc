use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub bpm: f32,
    pub sequencer_count: usize,
    pub bars: usize,
    pub beats_per_bar: usize,
    pub steps_per_beat: usize,
    /// Channel every sequencer starts on; leave unset to start muted.
    pub midi_channel: Option<u8>,
    /// Index of the MIDI output port to connect at startup.
    pub midi_port: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            sequencer_count: 8,
            bars: 1,
            beats_per_bar: 4,
            steps_per_beat: 4,
            midi_channel: Some(0),
            midi_port: None,
        }
    }
}

impl SessionConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SessionConfig::from_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = SessionConfig::from_str(
            r#"
            bpm = 90.0
            bars = 2
            midi_channel = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.bpm, 90.0);
        assert_eq!(config.bars, 2);
        assert_eq!(config.midi_channel, Some(9));
        assert_eq!(config.sequencer_count, 8);
        assert_eq!(config.steps_per_beat, 4);
    }

    #[test]
    fn test_invalid_config() {
        let result = SessionConfig::from_str("bars = \"many\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SessionConfig::from_file("/nonexistent/tickseq.toml");
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }
}
