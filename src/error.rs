use std::{
    error::Error,
    fmt::{Display, Formatter, Result as fmtResult},
    io::Error as ioError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerError {
    /// A step index outside `[0, step_count)`.
    StepOutOfRange { index: usize, step_count: usize },
    UnknownSequencer(usize),
}

impl Error for SequencerError {}

impl Display for SequencerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmtResult {
        match self {
            Self::StepOutOfRange { index, step_count } => write!(
                f,
                "Step {} is out of range for a grid of {} steps",
                index, step_count
            ),
            Self::UnknownSequencer(id) => write!(f, "There is no sequencer #{}", id),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    FileError(ioError),
    ParseError(toml::de::Error),
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FileError(err) => Some(err),
            Self::ParseError(err) => Some(err),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmtResult {
        match self {
            Self::FileError(err) => write!(f, "Failed to read the configuration: {}", err),
            Self::ParseError(err) => write!(f, "Invalid configuration: {}", err),
        }
    }
}

impl From<ioError> for ConfigError {
    fn from(from: ioError) -> Self {
        Self::FileError(from)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(from: toml::de::Error) -> Self {
        Self::ParseError(from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiError {
    Init(String),
    InvalidPort(usize),
    Connect(String),
    Send(String),
}

impl Error for MidiError {}

impl Display for MidiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmtResult {
        match self {
            Self::Init(cause) => write!(f, "Failed to create MIDI output: {}", cause),
            Self::InvalidPort(index) => write!(f, "Invalid port index: {}", index),
            Self::Connect(cause) => write!(f, "Failed to connect: {}", cause),
            Self::Send(cause) => write!(f, "Failed to send message: {}", cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_out_of_range_message() {
        let err = SequencerError::StepOutOfRange {
            index: 16,
            step_count: 16,
        };
        assert_eq!(
            err.to_string(),
            "Step 16 is out of range for a grid of 16 steps"
        );
    }

    #[test]
    fn test_config_error_keeps_source() {
        let err = ConfigError::from(ioError::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to read the configuration"));
    }
}
