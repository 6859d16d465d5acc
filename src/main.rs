#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use log::{info, warn};

#[cfg(feature = "gui")]
use tickseq::{
    midi_note_name, AudioOutput, ConfigError, MidiOutputDevice, NoteTransport, PlaybackEngine,
    PlaybackEvent, Session, SessionConfig, MAXIMUM_OCTAVES,
};

#[cfg(feature = "gui")]
const TICKSEQ_CONFIG: &str = "TICKSEQ_CONFIG";
#[cfg(feature = "gui")]
const DEFAULT_TICKSEQ_CONFIG: &str = "tickseq.toml";

#[cfg(feature = "gui")]
fn main() -> anyhow::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = init_config()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("tickseq - Step Sequencer"),
        ..Default::default()
    };

    eframe::run_native(
        "tickseq",
        options,
        Box::new(move |_cc| Ok(Box::new(SequencerApp::new(&config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the GUI: {e}"))
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
fn init_config() -> anyhow::Result<SessionConfig> {
    let config_path =
        std::env::var(TICKSEQ_CONFIG).unwrap_or_else(|_| DEFAULT_TICKSEQ_CONFIG.to_string());

    info!("Loading configuration from {} ...", config_path);
    match SessionConfig::from_file(&config_path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileError(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, using the default configuration", config_path);
            Ok(SessionConfig::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Forwards every trigger to both the MIDI port and the audio preview.
#[cfg(feature = "gui")]
struct Outputs {
    audio: AudioOutput,
    midi: MidiOutputDevice,
}

#[cfg(feature = "gui")]
impl NoteTransport for Outputs {
    fn note_on(&mut self, channel: u8, value: u8) {
        self.audio.note_on(channel, value);
        self.midi.note_on(channel, value);
    }

    fn note_off(&mut self, channel: u8, value: u8) {
        self.audio.note_off(channel, value);
        self.midi.note_off(channel, value);
    }
}

#[cfg(feature = "gui")]
struct SequencerApp {
    session: Session,
    outputs: Outputs,
    playback_engine: PlaybackEngine,

    // UI state
    available_midi_ports: Vec<String>,
    selected_port: Option<usize>,
}

#[cfg(feature = "gui")]
impl SequencerApp {
    fn new(config: &SessionConfig) -> Self {
        let available_midi_ports = MidiOutputDevice::available_ports();
        let mut midi = MidiOutputDevice::new();

        let selected_port = config.midi_port.and_then(|port| match midi.connect(port) {
            Ok(()) => Some(port),
            Err(err) => {
                warn!("{}", err);
                None
            }
        });

        Self {
            session: Session::new(config),
            outputs: Outputs {
                audio: AudioOutput::default(),
                midi,
            },
            playback_engine: PlaybackEngine::new(),
            available_midi_ports,
            selected_port,
        }
    }

    fn handle_playback_events(&mut self) {
        for event in self.playback_engine.poll_events() {
            match event {
                PlaybackEvent::Tick(elapsed) => self.session.tick(elapsed, &mut self.outputs),
            }
        }
    }

    fn start_playback(&mut self) {
        self.session.start_playback();
        self.playback_engine.start(self.session.tick_interval());
    }

    fn stop_playback(&mut self) {
        self.playback_engine.stop();
        self.session.stop_playback();
        self.outputs.audio.stop_note();
    }

    fn restart_clock(&mut self) {
        if self.playback_engine.is_running() {
            self.playback_engine.stop();
            self.playback_engine.start(self.session.tick_interval());
        }
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.session.is_playing() {
                if ui.button("⏸ Pause").clicked() {
                    self.stop_playback();
                }
            } else if ui.button("▶ Play").clicked() {
                self.start_playback();
            }

            ui.add_space(20.0);

            ui.label("BPM:");
            let mut bpm = self.session.bpm();
            if ui
                .add(egui::Slider::new(&mut bpm, 40.0..=240.0).step_by(1.0))
                .changed()
            {
                self.session.set_bpm(bpm);
                self.restart_clock();
            }

            ui.add_space(20.0);

            let mut switch_to = None;
            egui::ComboBox::from_id_source("sequencer")
                .selected_text(format!("Sequencer #{}", self.session.active_id()))
                .show_ui(ui, |ui| {
                    for sequencer in self.session.sequencers() {
                        let id = sequencer.id();
                        if ui
                            .selectable_label(self.session.active_id() == id, format!("Sequencer #{}", id))
                            .clicked()
                        {
                            switch_to = Some(id);
                        }
                    }
                });
            if let Some(id) = switch_to {
                if let Err(err) = self.session.switch_sequencer(id) {
                    warn!("{}", err);
                }
            }
        });
    }

    fn navigation_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let octave = self.session.current_octave();
            if ui.add_enabled(octave > 0, egui::Button::new("Octave -")).clicked() {
                self.session.octave_down();
            }
            ui.label(format!("Octave: {}", self.session.current_octave()));
            if ui
                .add_enabled(octave < MAXIMUM_OCTAVES, egui::Button::new("Octave +"))
                .clicked()
            {
                self.session.octave_up();
            }

            ui.add_space(20.0);

            let bar = self.session.current_bar();
            let bars = self.session.active_sequencer().bars();
            if ui.add_enabled(bar > 0, egui::Button::new("◀ Bar")).clicked() {
                self.session.previous_bar();
            }
            ui.label(format!("Bar: {}/{}", self.session.current_bar() + 1, bars));
            if ui
                .add_enabled(bar + 1 < bars, egui::Button::new("Bar ▶"))
                .clicked()
            {
                self.session.next_bar();
            }

            ui.add_space(20.0);
            ui.label(format!("Beat: {}", self.session.current_beat()));

            ui.add_space(20.0);
            match self.session.active_sequencer().midi_channel() {
                Some(channel) => ui.label(format!("MIDI channel: {}", channel + 1)),
                None => ui.label("Muted"),
            };
        });
    }

    fn step_grid_ui(&mut self, ui: &mut egui::Ui) {
        let is_playing = self.session.is_playing();
        let octave_start = self.session.octave_note_range().start;
        let bar_steps = self.session.bar_step_range();
        let active_step = self.session.active_sequencer().active_step();

        let mut clicked = None;
        ui.horizontal(|ui| {
            for (column, step) in bar_steps.enumerate() {
                let note = self
                    .session
                    .active_sequencer()
                    .steps()
                    .get(step)
                    .copied()
                    .unwrap_or_default();

                ui.vertical(|ui| {
                    for offset in (0..12u8).rev() {
                        let value = octave_start + offset;
                        let is_set = note.value == Some(value);
                        let is_current = is_playing && step == active_step;

                        let fill = if is_set && note.is_hold {
                            egui::Color32::from_rgb(90, 90, 160)
                        } else if is_set {
                            egui::Color32::from_rgb(60, 60, 200)
                        } else if is_current {
                            egui::Color32::from_rgb(100, 200, 100)
                        } else {
                            egui::Color32::from_rgb(40, 40, 40)
                        };

                        let button = egui::Button::new(midi_note_name(value))
                            .min_size(egui::vec2(44.0, 24.0))
                            .fill(fill);

                        if ui.add(button).clicked() {
                            clicked = Some((column, offset, !is_set));
                        }
                    }
                });
            }
        });

        if let Some((column, offset, pressed)) = clicked {
            if let Err(err) = self.session.sequence_step(column, offset, pressed) {
                warn!("{}", err);
            }
        }
    }
}

#[cfg(feature = "gui")]
impl eframe::App for SequencerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.handle_playback_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("tickseq - Step Sequencer");
            ui.add_space(10.0);

            // MIDI Port Selection
            let mut selected_port_changed = None;
            ui.horizontal(|ui| {
                ui.label("MIDI Output:");
                if self.available_midi_ports.is_empty() {
                    ui.label("No MIDI ports available");
                } else {
                    egui::ComboBox::from_id_source("midi_port")
                        .selected_text(
                            self.selected_port
                                .and_then(|i| self.available_midi_ports.get(i))
                                .map(String::as_str)
                                .unwrap_or("Select port..."),
                        )
                        .show_ui(ui, |ui| {
                            for (i, port_name) in self.available_midi_ports.iter().enumerate() {
                                if ui
                                    .selectable_label(self.selected_port == Some(i), port_name)
                                    .clicked()
                                {
                                    selected_port_changed = Some(i);
                                }
                            }
                        });
                }
            });

            if let Some(port_idx) = selected_port_changed {
                match self.outputs.midi.connect(port_idx) {
                    Ok(()) => self.selected_port = Some(port_idx),
                    Err(err) => warn!("{}", err),
                }
            }

            ui.add_space(10.0);
            self.transport_ui(ui);
            ui.add_space(10.0);
            self.navigation_ui(ui);
            ui.add_space(20.0);
            self.step_grid_ui(ui);

            // Info
            ui.separator();
            ui.label("Click a note to program the step, click it again to clear it");
            if !self.outputs.midi.is_connected() {
                ui.colored_label(
                    egui::Color32::YELLOW,
                    "⚠ No MIDI output connected - audio playback only",
                );
            }
        });
    }
}

#[cfg(feature = "gui")]
impl Drop for SequencerApp {
    fn drop(&mut self) {
        self.playback_engine.stop();
        self.outputs.midi.disconnect();
    }
}
