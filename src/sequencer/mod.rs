/// Core sequencer logic - step grid, playback cursor and note triggering
use std::time::Duration;

use log::{debug, trace};

use crate::error::SequencerError;

pub mod grid;
pub mod playback;
pub mod trigger;

pub use grid::{Note, StepGrid};
pub use trigger::{NoteTransport, TriggerEvent};

/// Highest zero-based bar count, so at most 8 bars.
pub const MAXIMUM_BARS: usize = 7;

pub struct Sequencer {
    id: usize,
    steps: StepGrid,
    active_step: usize,
    bars: usize,
    beats_per_bar: usize,
    subdivision: usize,
    midi_channel: Option<u8>,
}

impl Sequencer {
    pub fn new(
        id: usize,
        bars: usize,
        beats_per_bar: usize,
        subdivision: usize,
        midi_channel: Option<u8>,
    ) -> Self {
        let bars = bars.min(MAXIMUM_BARS);

        Self {
            id,
            steps: StepGrid::new(bars, beats_per_bar, subdivision),
            active_step: 0,
            bars,
            beats_per_bar,
            subdivision,
            midi_channel,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn steps(&self) -> &StepGrid {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.step_count()
    }

    pub fn steps_per_bar(&self) -> usize {
        self.steps.steps_per_bar()
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    /// Clamps to `MAXIMUM_BARS` and resizes the grid, keeping surviving steps.
    pub fn set_bars(&mut self, bars: usize) {
        self.bars = bars.min(MAXIMUM_BARS);
        self.steps.resize(self.bars);
        if self.active_step >= self.step_count() {
            self.active_step = 0;
        }
    }

    pub fn beats_per_bar(&self) -> usize {
        self.beats_per_bar
    }

    pub fn subdivision(&self) -> usize {
        self.subdivision
    }

    pub fn midi_channel(&self) -> Option<u8> {
        self.midi_channel
    }

    /// `None` mutes the sequencer: it keeps advancing but emits nothing.
    pub fn set_midi_channel(&mut self, midi_channel: Option<u8>) {
        self.midi_channel = midi_channel;
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn reset(&mut self) {
        self.active_step = 0;
    }

    pub fn previous_step_index(&self) -> usize {
        self.previous_step_index_of(self.active_step)
    }

    pub fn previous_step_index_of(&self, index: usize) -> usize {
        match index {
            0 => self.step_count().saturating_sub(1),
            _ => index - 1,
        }
    }

    pub fn next_step_index(&self) -> usize {
        self.next_step_index_of(self.active_step)
    }

    pub fn next_step_index_of(&self, index: usize) -> usize {
        if index + 1 >= self.step_count() {
            0
        } else {
            index + 1
        }
    }

    /// Advance the cursor one step and trigger notes for the new step.
    ///
    /// A hold step emits nothing. Otherwise the note of the step structurally
    /// before the cursor is released, then the current note (if any) starts.
    pub fn tick<T: NoteTransport>(&mut self, _elapsed: Duration, transport: &mut T) {
        if self.step_count() == 0 {
            return;
        }

        self.active_step = self.next_step_index();
        self.process_step(transport);
    }

    fn process_step<T: NoteTransport>(&self, transport: &mut T) {
        let current = self.steps[self.active_step];
        if current.is_hold {
            return;
        }

        let channel = match self.midi_channel {
            Some(channel) => channel,
            None => return,
        };

        let previous = self.steps[self.previous_step_index()];
        if let Some(value) = previous.value {
            trace!("Sequencer #{} NoteOff {} on channel {}", self.id, value, channel);
            transport.note_off(channel, value);
        }

        if let Some(value) = current.value {
            trace!("Sequencer #{} NoteOn {} on channel {}", self.id, value, channel);
            transport.note_on(channel, value);
        }
    }

    fn check_step(&self, index: usize) -> Result<(), SequencerError> {
        if self.steps.contains(index) {
            Ok(())
        } else {
            Err(SequencerError::StepOutOfRange {
                index,
                step_count: self.step_count(),
            })
        }
    }

    pub fn set_note_for_step(
        &mut self,
        index: usize,
        value: Option<u8>,
    ) -> Result<(), SequencerError> {
        self.check_step(index)?;
        debug!("Sequencer #{} step {} = {:?}", self.id, index, value);
        self.steps[index] = Note::new(value, false);
        Ok(())
    }

    /// Clears `index` and the chain of hold steps that follows it.
    pub fn clear_note_for_step(&mut self, index: usize) -> Result<(), SequencerError> {
        self.check_step(index)?;
        self.steps[index].clear();

        let mut next = index + 1;
        while self.steps.get(next).map_or(false, |note| note.is_hold) {
            self.steps[next].clear();
            next += 1;
        }

        debug!("Sequencer #{} cleared steps {}..{}", self.id, index, next);
        Ok(())
    }

    /// Writes `value` at `first` and holds it through `last` inclusive.
    ///
    /// Stops at the first already programmed step, or at the end of the grid,
    /// leaving whatever was written so far in place.
    pub fn set_note_for_step_range(
        &mut self,
        first: usize,
        last: usize,
        value: u8,
    ) -> Result<(), SequencerError> {
        self.check_step(first)?;
        let step_count = self.step_count();

        self.steps[first] = Note::new(Some(value), false);

        for held in first + 1..=last {
            if held >= step_count || !self.steps[held].is_empty() {
                debug!(
                    "Sequencer #{} hold {}..={} stopped at step {}",
                    self.id, first, last, held
                );
                return Ok(());
            }
            self.steps[held] = Note::new(Some(value), true);
        }

        let held_step = self.steps[first];
        if held_step.is_hold || last >= step_count {
            return Ok(());
        }
        for index in first + 1..=last {
            self.steps[index] = Note::new(held_step.value, true);
        }

        debug!("Sequencer #{} hold {}..={} = {}", self.id, first, last, value);
        Ok(())
    }
}
