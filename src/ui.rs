//! egui screens: the setup menu, the in-game HUD and the pause overlay.

use delta_life::config::{
    default_cell_size, Args, CELL_SIZES, GLIDER_CELL_SIZE, PROBABILITIES, WORLD_SIZES,
};
use delta_life::{ControlEvent, RunState, SeedMode, Session, SimConfig};

const TEXT_COLOR: egui::Color32 = egui::Color32::RED;

/// Key help shown in the HUD.
pub const KEY_HELP: &str = "UP/DOWN speed, (P) pause, (R) resume, (S) restart, (Q/Esc) quit";

/// Something the user asked for through the UI this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    Start(SimConfig),
    Control(ControlEvent),
    /// Abandon the current run and go back to the setup menu.
    NewWorld,
}

/// Choices collected by the setup menu before a run starts.
#[derive(Debug, Clone)]
pub struct SetupMenu {
    pub wrap: bool,
    pub glider: bool,
    pub glider_count: u8,
    pub world_size: usize,
    pub cell_size: u32,
    pub probability: f64,
    pub rng_seed: Option<u64>,
    pub speed: u32,
    pub error: Option<String>,
}

impl SetupMenu {
    /// Menu preselected from whatever flags were given.
    pub fn from_args(args: &Args) -> Self {
        let world_size = args.size.unwrap_or(WORLD_SIZES[0]);
        Self {
            wrap: args.wrap,
            glider: args.gliders.is_some(),
            glider_count: args.gliders.unwrap_or(1),
            world_size,
            cell_size: args.cell_size.unwrap_or_else(|| default_cell_size(world_size)),
            probability: args.probability.unwrap_or(PROBABILITIES[1]),
            rng_seed: args.seed,
            speed: args.speed,
            error: None,
        }
    }

    /// Menu preselected from a previous run.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut menu = Self {
            wrap: config.wrap,
            glider: false,
            glider_count: 1,
            world_size: WORLD_SIZES[0],
            cell_size: config.cell_size,
            probability: PROBABILITIES[1],
            rng_seed: config.rng_seed,
            speed: config.speed,
            error: None,
        };
        match config.seed {
            SeedMode::Random { width, probability, .. } => {
                menu.world_size = width;
                menu.probability = probability;
            }
            SeedMode::GliderGun { count } => {
                menu.glider = true;
                menu.glider_count = count;
                menu.cell_size = default_cell_size(WORLD_SIZES[0]);
            }
        }
        menu
    }

    pub fn to_config(&self) -> delta_life::Result<SimConfig> {
        let (seed, cell_size) = if self.glider {
            (SeedMode::GliderGun { count: self.glider_count }, GLIDER_CELL_SIZE)
        } else {
            let seed = SeedMode::Random {
                width: self.world_size,
                height: self.world_size,
                probability: self.probability,
            };
            (seed, self.cell_size)
        };
        SimConfig::new(seed, self.wrap, cell_size)?
            .with_rng_seed(self.rng_seed)
            .with_speed(self.speed)
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<UiAction> {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");
            ui.separator();

            ui.label("Wrap cells?");
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.wrap, true, "Wrap cells");
                ui.radio_value(&mut self.wrap, false, "Don't wrap cells");
            });
            ui.separator();

            ui.label("Run a Gosper's glider gun?");
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.glider, true, "Yes");
                ui.radio_value(&mut self.glider, false, "No");
            });

            if self.glider {
                ui.label("1 or 2 glider guns?");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.glider_count, 1, "One");
                    ui.radio_value(&mut self.glider_count, 2, "Two");
                });
            } else {
                ui.label("Select world size:");
                ui.horizontal(|ui| {
                    for size in WORLD_SIZES {
                        ui.radio_value(&mut self.world_size, size, size.to_string());
                    }
                });
                ui.label("Select cell size:");
                ui.horizontal(|ui| {
                    for size in CELL_SIZES {
                        ui.radio_value(&mut self.cell_size, size, size.to_string());
                    }
                });
                ui.label("Select probability of each cell to begin alive:");
                ui.horizontal(|ui| {
                    for p in PROBABILITIES {
                        ui.radio_value(&mut self.probability, p, p.to_string());
                    }
                });
            }
            ui.separator();

            if ui.button("START GAME!").clicked() {
                match self.to_config() {
                    Ok(config) => {
                        self.error = None;
                        action = Some(UiAction::Start(config));
                    }
                    Err(err) => self.error = Some(err.to_string()),
                }
            }
            if let Some(error) = &self.error {
                ui.colored_label(TEXT_COLOR, error.as_str());
            }
        });

        action
    }
}

/// Generation counter, speed and key help along the bottom edge.
pub fn hud(ctx: &egui::Context, session: &Session) {
    let live = session.grid().map_or(0, |grid| grid.live_count());
    let panel_frame = egui::Frame {
        fill: egui::Color32::from_rgba_unmultiplied(25, 25, 25, 100),
        inner_margin: egui::Margin::same(4.0),
        ..egui::Frame::default()
    };

    egui::Area::new(egui::Id::new("hud_area"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            panel_frame.show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.colored_label(TEXT_COLOR, format!("Generation: {}", session.generation()));
                    ui.colored_label(TEXT_COLOR, format!("Speed: {}", session.speed()));
                    ui.colored_label(TEXT_COLOR, format!("Live: {live}"));
                    ui.colored_label(TEXT_COLOR, KEY_HELP);
                });
            });
        });
}

/// Pause prompt with the same choices as the keyboard shortcuts.
pub fn pause_overlay(ctx: &egui::Context) -> Option<UiAction> {
    let mut action = None;

    egui::Window::new("Paused")
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.colored_label(TEXT_COLOR, "Paused: (R) resume, (S) restart, (Q) quit");
            ui.horizontal(|ui| {
                if ui.button("Resume").clicked() {
                    action = Some(UiAction::Control(ControlEvent::Resume));
                }
                if ui.button("Restart").clicked() {
                    action = Some(UiAction::Control(ControlEvent::Restart));
                }
                if ui.button("New world").clicked() {
                    action = Some(UiAction::NewWorld);
                }
                if ui.button("Quit").clicked() {
                    action = Some(UiAction::Control(ControlEvent::Quit));
                }
            });
        });

    action
}

/// Draw the UI for the current session state.
pub fn session_ui(ctx: &egui::Context, session: &Session) -> Option<UiAction> {
    hud(ctx, session);
    match session.state() {
        RunState::Paused => pause_overlay(ctx),
        RunState::Running | RunState::Stopped => None,
    }
}
