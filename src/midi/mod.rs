/// MIDI output using midir
use log::{info, warn};
use midir::{MidiOutput, MidiOutputConnection};

use crate::error::MidiError;
use crate::sequencer::NoteTransport;

const CLIENT_NAME: &str = "tickseq MIDI Output";
const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;
pub const DEFAULT_VELOCITY: u8 = 100;

pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
}

impl MidiOutputDevice {
    pub fn new() -> Self {
        Self { connection: None }
    }

    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(&mut self, port_index: usize) -> Result<(), MidiError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(|e| MidiError::Init(e.to_string()))?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or(MidiError::InvalidPort(port_index))?;
        let name = midi_out.port_name(port).unwrap_or_default();

        let connection = midi_out
            .connect(port, "tickseq")
            .map_err(|e| MidiError::Connect(e.to_string()))?;

        info!("Connected to MIDI port {} ({})", port_index, name);
        self.connection = Some(connection);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn send(&mut self, message: [u8; 3]) -> Result<(), MidiError> {
        if let Some(ref mut conn) = self.connection {
            conn.send(&message)
                .map_err(|e| MidiError::Send(e.to_string()))?;
        }
        Ok(())
    }

    pub fn send_note_on(&mut self, channel: u8, note: u8) -> Result<(), MidiError> {
        self.send(note_on_message(channel, note, DEFAULT_VELOCITY))
    }

    pub fn send_note_off(&mut self, channel: u8, note: u8) -> Result<(), MidiError> {
        self.send(note_off_message(channel, note))
    }

    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

impl Default for MidiOutputDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteTransport for MidiOutputDevice {
    fn note_on(&mut self, channel: u8, value: u8) {
        if let Err(err) = self.send_note_on(channel, value) {
            warn!("{}", err);
        }
    }

    fn note_off(&mut self, channel: u8, value: u8) {
        if let Err(err) = self.send_note_off(channel, value) {
            warn!("{}", err);
        }
    }
}

fn note_on_message(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [NOTE_ON | (channel & 0x0f), note & 0x7f, velocity & 0x7f]
}

fn note_off_message(channel: u8, note: u8) -> [u8; 3] {
    [NOTE_OFF | (channel & 0x0f), note & 0x7f, 0]
}

pub fn midi_note_name(note: u8) -> String {
    let note_names = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = (note / 12) as i32 - 1;
    let note_index = (note % 12) as usize;
    format!("{}{}", note_names[note_index], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_messages() {
        assert_eq!(note_on_message(0, 60, 100), [0x90, 60, 100]);
        assert_eq!(note_on_message(9, 36, 127), [0x99, 36, 127]);
        assert_eq!(note_off_message(3, 64), [0x83, 64, 0]);
    }

    #[test]
    fn test_disconnected_device_ignores_triggers() {
        let mut device = MidiOutputDevice::new();
        assert!(!device.is_connected());
        assert_eq!(device.send_note_on(0, 60), Ok(()));
        device.note_off(0, 60);
    }

    #[test]
    fn test_midi_note_name() {
        assert_eq!(midi_note_name(60), "C4");
        assert_eq!(midi_note_name(0), "C-1");
        assert_eq!(midi_note_name(69), "A4");
    }
}
