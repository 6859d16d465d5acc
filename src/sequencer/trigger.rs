/// Boundary between the sequencer and whatever makes the sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    NoteOn { channel: u8, value: u8 },
    NoteOff { channel: u8, value: u8 },
}

/// Receives note triggers synchronously from `Sequencer::tick`.
///
/// Implementations are fire-and-forget: the sequencer never learns whether
/// a trigger reached its destination.
pub trait NoteTransport {
    fn note_on(&mut self, channel: u8, value: u8);
    fn note_off(&mut self, channel: u8, value: u8);
}

impl NoteTransport for Vec<TriggerEvent> {
    fn note_on(&mut self, channel: u8, value: u8) {
        self.push(TriggerEvent::NoteOn { channel, value });
    }

    fn note_off(&mut self, channel: u8, value: u8) {
        self.push(TriggerEvent::NoteOff { channel, value });
    }
}
