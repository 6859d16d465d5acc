/// Audio preview using cpal - a single sine voice following the triggers
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, warn};
use std::sync::{Arc, Mutex};

use crate::sequencer::NoteTransport;

pub struct AudioOutput {
    _stream: Option<cpal::Stream>,
    trigger: Arc<Mutex<Option<f32>>>,
    sounding: Option<u8>,
}

impl AudioOutput {
    pub fn new() -> Option<Self> {
        let trigger = Arc::new(Mutex::new(None));
        let stream = Self::setup_audio_stream(Arc::clone(&trigger))?;

        Some(Self {
            _stream: Some(stream),
            trigger,
            sounding: None,
        })
    }

    /// An output that tracks notes but makes no sound.
    pub fn silent() -> Self {
        Self {
            _stream: None,
            trigger: Arc::new(Mutex::new(None)),
            sounding: None,
        }
    }

    fn setup_audio_stream(trigger: Arc<Mutex<Option<f32>>>) -> Option<cpal::Stream> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let mut phase = 0.0_f32;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frequency = trigger.lock().ok().and_then(|t| *t);

                    for frame in data.chunks_mut(channels.max(1)) {
                        let value = match frequency {
                            Some(frequency) => {
                                let value = (phase * 2.0 * std::f32::consts::PI).sin() * 0.2;
                                phase = (phase + frequency / sample_rate).fract();
                                value
                            }
                            None => {
                                phase = 0.0;
                                0.0
                            }
                        };
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            ),
            format => {
                warn!("Unsupported sample format {:?}, audio preview disabled", format);
                return None;
            }
        };

        match stream {
            Ok(stream) => {
                if let Err(err) = stream.play() {
                    warn!("Failed to start the audio stream: {}", err);
                }
                Some(stream)
            }
            Err(err) => {
                warn!("Failed to build the audio stream: {}", err);
                None
            }
        }
    }

    pub fn sounding(&self) -> Option<u8> {
        self.sounding
    }

    pub fn trigger_note(&mut self, note: u8) {
        self.sounding = Some(note);
        self.set_frequency(Some(midi_note_to_frequency(note)));
    }

    pub fn stop_note(&mut self) {
        self.sounding = None;
        self.set_frequency(None);
    }

    fn set_frequency(&self, frequency: Option<f32>) {
        if let Ok(mut trigger) = self.trigger.lock() {
            *trigger = frequency;
        }
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new().unwrap_or_else(Self::silent)
    }
}

impl NoteTransport for AudioOutput {
    fn note_on(&mut self, _channel: u8, value: u8) {
        self.trigger_note(value);
    }

    /// Only silences the voice if `value` is what it is playing.
    fn note_off(&mut self, _channel: u8, value: u8) {
        if self.sounding == Some(value) {
            self.stop_note();
        }
    }
}

fn midi_note_to_frequency(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
