/// Session state - the sequencers plus everything the editor navigates by
use std::ops::Range;
use std::time::Duration;

use log::info;

use crate::config::SessionConfig;
use crate::error::SequencerError;
use crate::sequencer::playback::tick_interval;
use crate::sequencer::{NoteTransport, Sequencer};

/// Highest selectable octave, so five octaves in total.
pub const MAXIMUM_OCTAVES: u8 = 4;
pub const DEFAULT_OCTAVE: u8 = 2;
pub const NOTES_PER_OCTAVE: u8 = 12;

pub const MIN_BPM: f32 = 40.0;
pub const MAX_BPM: f32 = 240.0;

pub struct Session {
    sequencers: Vec<Sequencer>,
    active: usize,
    current_octave: u8,
    current_bar: usize,
    bpm: f32,
    is_playing: bool,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        let sequencers = (0..config.sequencer_count.max(1))
            .map(|id| {
                Sequencer::new(
                    id,
                    config.bars,
                    config.beats_per_bar,
                    config.steps_per_beat,
                    config.midi_channel,
                )
            })
            .collect();

        Self {
            sequencers,
            active: 0,
            current_octave: DEFAULT_OCTAVE,
            current_bar: 0,
            bpm: config.bpm.clamp(MIN_BPM, MAX_BPM),
            is_playing: false,
        }
    }

    pub fn sequencers(&self) -> &[Sequencer] {
        &self.sequencers
    }

    pub fn active_id(&self) -> usize {
        self.active
    }

    pub fn active_sequencer(&self) -> &Sequencer {
        &self.sequencers[self.active]
    }

    pub fn active_sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencers[self.active]
    }

    pub fn switch_sequencer(&mut self, id: usize) -> Result<(), SequencerError> {
        if id >= self.sequencers.len() {
            return Err(SequencerError::UnknownSequencer(id));
        }
        info!("Switching to Sequencer #{}", id);
        self.active = id;
        self.current_bar = self.current_bar();
        Ok(())
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Step period of the active sequencer at the current tempo.
    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.bpm, self.active_sequencer().subdivision())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn start_playback(&mut self) {
        for sequencer in &mut self.sequencers {
            sequencer.reset();
        }
        self.is_playing = true;
        info!("Playback Started");
    }

    pub fn stop_playback(&mut self) {
        self.is_playing = false;
        info!("Playback Stopped");
    }

    pub fn tick<T: NoteTransport>(&mut self, elapsed: Duration, transport: &mut T) {
        for sequencer in &mut self.sequencers {
            sequencer.tick(elapsed, transport);
        }
    }

    pub fn current_octave(&self) -> u8 {
        self.current_octave
    }

    pub fn octave_up(&mut self) {
        if self.current_octave < MAXIMUM_OCTAVES {
            self.current_octave += 1;
        }
    }

    pub fn octave_down(&mut self) {
        self.current_octave = self.current_octave.saturating_sub(1);
    }

    pub fn octave_note_range(&self) -> Range<u8> {
        let start = self.current_octave * NOTES_PER_OCTAVE;
        start..start + NOTES_PER_OCTAVE
    }

    /// Bar shown by the editor, kept inside the active sequencer's grid.
    pub fn current_bar(&self) -> usize {
        self.current_bar.min(self.last_bar())
    }

    /// Resizes the active sequencer and pulls the editor back inside it.
    pub fn set_bars(&mut self, bars: usize) {
        self.active_sequencer_mut().set_bars(bars);
        self.current_bar = self.current_bar();
    }

    fn last_bar(&self) -> usize {
        self.active_sequencer().bars().saturating_sub(1)
    }

    pub fn next_bar(&mut self) {
        self.current_bar = (self.current_bar() + 1).min(self.last_bar());
    }

    pub fn previous_bar(&mut self) {
        self.current_bar = self.current_bar().saturating_sub(1);
    }

    pub fn bar_step_range(&self) -> Range<usize> {
        let steps_per_bar = self.active_sequencer().steps_per_bar();
        let start = self.current_bar() * steps_per_bar;
        start..start + steps_per_bar
    }

    pub fn current_beat(&self) -> usize {
        let sequencer = self.active_sequencer();
        sequencer.active_step() / sequencer.subdivision().max(1)
    }

    /// Editor entry point: a note cell in the current bar and octave was
    /// pressed (programs the note) or released (unsets that step only).
    pub fn sequence_step(
        &mut self,
        step_in_bar: usize,
        note_offset: u8,
        pressed: bool,
    ) -> Result<(), SequencerError> {
        let step = self.bar_step_range().start + step_in_bar;
        if !pressed {
            info!("Clearing Sequencer #{} Step {}", self.active, step);
            return self.active_sequencer_mut().set_note_for_step(step, None);
        }

        let value = self.current_octave * NOTES_PER_OCTAVE + note_offset % NOTES_PER_OCTAVE;
        info!(
            "Scheduling Sequencer #{} to Play Note {} on Step {}",
            self.active, value, step
        );
        self.active_sequencer_mut().set_note_for_step(step, Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{Note, TriggerEvent};

    fn session() -> Session {
        Session::new(&SessionConfig::default())
    }

    #[test]
    fn test_new_session() {
        let session = session();
        assert_eq!(session.sequencers().len(), 8);
        assert_eq!(session.active_id(), 0);
        assert_eq!(session.current_octave(), DEFAULT_OCTAVE);
        assert_eq!(session.active_sequencer().step_count(), 16);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_switch_sequencer() {
        let mut session = session();
        session.switch_sequencer(3).unwrap();
        assert_eq!(session.active_sequencer().id(), 3);
        assert_eq!(
            session.switch_sequencer(8),
            Err(SequencerError::UnknownSequencer(8))
        );
        assert_eq!(session.active_id(), 3);
    }

    #[test]
    fn test_octave_navigation_is_clamped() {
        let mut session = session();
        for _ in 0..10 {
            session.octave_up();
        }
        assert_eq!(session.current_octave(), MAXIMUM_OCTAVES);
        assert_eq!(session.octave_note_range(), 48..60);
        for _ in 0..10 {
            session.octave_down();
        }
        assert_eq!(session.current_octave(), 0);
        assert_eq!(session.octave_note_range(), 0..12);
    }

    #[test]
    fn test_bar_navigation_is_clamped() {
        let config = SessionConfig {
            bars: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config);
        session.previous_bar();
        assert_eq!(session.current_bar(), 0);
        for _ in 0..5 {
            session.next_bar();
        }
        assert_eq!(session.current_bar(), 2);
        assert_eq!(session.bar_step_range(), 32..48);
    }

    #[test]
    fn test_sequence_step_uses_octave_and_bar() {
        let config = SessionConfig {
            bars: 2,
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config);
        session.next_bar();
        session.octave_up();
        session.sequence_step(2, 5, true).unwrap();
        assert_eq!(session.active_sequencer().steps()[18].value, Some(41));

        session.sequence_step(2, 5, false).unwrap();
        assert_eq!(session.active_sequencer().steps()[18].value, None);
    }

    #[test]
    fn test_release_on_held_range_only_unsets_that_step() {
        let mut session = session();
        session
            .active_sequencer_mut()
            .set_note_for_step_range(0, 3, 24)
            .unwrap();

        session.sequence_step(0, 0, false).unwrap();

        let steps = session.active_sequencer().steps();
        assert_eq!(steps[0], Note::empty());
        for index in 1..=3 {
            assert_eq!(steps[index], Note::new(Some(24), true));
        }
        assert_eq!(steps[4], Note::empty());
    }

    #[test]
    fn test_current_bar_follows_shrinking_grid() {
        let config = SessionConfig {
            bars: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::new(&config);
        session.next_bar();
        session.next_bar();
        assert_eq!(session.current_bar(), 2);

        session.active_sequencer_mut().set_bars(1);
        assert_eq!(session.current_bar(), 0);
        assert_eq!(session.bar_step_range(), 0..16);
        session.previous_bar();
        assert_eq!(session.current_bar(), 0);

        session.set_bars(3);
        session.next_bar();
        assert_eq!(session.current_bar(), 1);
        session.set_bars(1);
        assert_eq!(session.current_bar(), 0);
        session.set_bars(2);
        assert_eq!(session.current_bar(), 0);
        assert!(session.sequence_step(15, 0, true).is_ok());
        assert_eq!(session.active_sequencer().steps()[15].value, Some(24));
    }

    #[test]
    fn test_sequence_step_out_of_bar() {
        let mut session = session();
        assert!(session.sequence_step(16, 0, true).is_err());
    }

    #[test]
    fn test_bpm_and_tick_interval() {
        let mut session = session();
        assert_eq!(session.tick_interval(), tick_interval(120.0, 4));
        session.set_bpm(1000.0);
        assert_eq!(session.bpm(), MAX_BPM);
        session.set_bpm(1.0);
        assert_eq!(session.bpm(), MIN_BPM);
    }

    #[test]
    fn test_start_playback_resets_cursors() {
        let mut session = session();
        let mut events: Vec<TriggerEvent> = Vec::new();
        session.tick(Duration::ZERO, &mut events);
        session.tick(Duration::ZERO, &mut events);
        assert!(session.sequencers().iter().all(|s| s.active_step() == 2));

        session.start_playback();
        assert!(session.is_playing());
        assert!(session.sequencers().iter().all(|s| s.active_step() == 0));

        session.stop_playback();
        assert!(!session.is_playing());
    }

    #[test]
    fn test_tick_drives_every_sequencer() {
        let mut session = session();
        session.active_sequencer_mut().set_note_for_step(1, Some(60)).unwrap();
        session.switch_sequencer(1).unwrap();
        session.active_sequencer_mut().set_midi_channel(Some(1));
        session.active_sequencer_mut().set_note_for_step(1, Some(64)).unwrap();

        let mut events: Vec<TriggerEvent> = Vec::new();
        session.tick(Duration::ZERO, &mut events);
        assert_eq!(
            events,
            vec![
                TriggerEvent::NoteOn { channel: 0, value: 60 },
                TriggerEvent::NoteOn { channel: 1, value: 64 },
            ]
        );
        assert_eq!(session.current_beat(), 0);
    }
}
