/// Step storage - one `Note` per step, sized by bars × beats × subdivision
use std::ops::{Index, IndexMut};

/// A single step slot. `value` is the note number, `None` is silence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Note {
    pub value: Option<u8>,
    /// Continues the note of an earlier step instead of retriggering it.
    pub is_hold: bool,
}

impl Note {
    pub fn new(value: Option<u8>, is_hold: bool) -> Self {
        Self { value, is_hold }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

#[derive(Debug, Clone)]
pub struct StepGrid {
    steps: Vec<Note>,
    beats_per_bar: usize,
    subdivision: usize,
}

impl StepGrid {
    pub fn new(bars: usize, beats_per_bar: usize, subdivision: usize) -> Self {
        let mut grid = Self {
            steps: Vec::new(),
            beats_per_bar,
            subdivision,
        };
        grid.resize(bars);
        grid
    }

    /// Keeps the notes of surviving steps, appends empty ones and drops the rest.
    pub fn resize(&mut self, bars: usize) {
        let step_count = bars * self.beats_per_bar * self.subdivision;
        self.steps.resize_with(step_count, Note::empty);
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn steps_per_bar(&self) -> usize {
        self.beats_per_bar * self.subdivision
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.steps.len()
    }

    pub fn get(&self, index: usize) -> Option<&Note> {
        self.steps.get(index)
    }

    /// Panics if `index` is outside the grid.
    pub fn set(&mut self, index: usize, note: Note) {
        self[index] = note;
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Note)> {
        self.steps.iter().enumerate()
    }
}

impl Index<usize> for StepGrid {
    type Output = Note;

    fn index(&self, index: usize) -> &Note {
        &self.steps[index]
    }
}

impl IndexMut<usize> for StepGrid {
    fn index_mut(&mut self, index: usize) -> &mut Note {
        &mut self.steps[index]
    }
}
