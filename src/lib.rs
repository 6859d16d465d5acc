/// tickseq - a tick-driven step sequencer library
///
/// This library provides the core components for building step sequencers:
/// - A step grid of notes with hold (sustain) semantics
/// - A sequencer that advances on an external clock tick and emits note triggers
/// - A session owning several sequencers plus editor navigation state
/// - MIDI output for production use, audio output for previewing

pub mod audio;
pub mod config;
pub mod error;
pub mod midi;
pub mod sequencer;
pub mod session;

// Re-export commonly used types
pub use audio::AudioOutput;
pub use config::SessionConfig;
pub use error::{ConfigError, MidiError, SequencerError};
pub use midi::{midi_note_name, MidiOutputDevice};
pub use sequencer::playback::{tick_interval, PlaybackEngine, PlaybackEvent};
pub use sequencer::{Note, NoteTransport, Sequencer, StepGrid, TriggerEvent, MAXIMUM_BARS};
pub use session::{Session, MAXIMUM_OCTAVES};
