//! Interactive flock viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Simulator`] and implements
//! [`eframe::App`] to step it on a timer and draw each agent as a marker.
//! The simulator never sees any egui type: each tick the viewer calls
//! [`Simulator::step`] and renders the resulting [`Simulator::snapshot`].

use eframe::App;
use flock_core::{Config, FlockError, SimSettings, Simulator, StepSummary, UpdateOrder};
use glam::DVec2;
use tracing::{info, warn};

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the arena and the latest snapshot.
///
/// ### Fields
/// - `sim` - The flock being simulated.
/// - `settings` - Count, arena and seed used when resetting.
/// - `cfg` - Rule parameters being edited; pushed into `sim` when changed.
/// - `config_error` - Message from the last rejected `cfg`, if any.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Pixels per world unit.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_summary` - Counters from the most recent step.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    sim: Simulator,
    settings: SimSettings,
    cfg: Config,
    config_error: Option<String>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    last_summary: StepSummary,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer around a freshly initialized flock.
    ///
    /// ### Errors
    /// Returns the [`FlockError`] from [`Simulator::new`] if `settings` or
    /// `cfg` are invalid.
    pub fn new(settings: SimSettings, cfg: Config) -> Result<Self, FlockError> {
        let sim = Simulator::new(settings, cfg)?;
        let settings = SimSettings {
            seed: sim.seed(),
            ..settings
        };

        Ok(Self {
            sim,
            settings,
            cfg,
            config_error: None,
            running: false,
            zoom: 40.0,
            pan: egui::vec2(0.0, 0.0),
            last_summary: StepSummary::default(),
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Rebuilds the flock with a new random seed.
    ///
    /// Keeps the agent count, arena and current configuration, stops
    /// auto-running and clears the last step summary.
    fn reset(&mut self) {
        let settings = SimSettings {
            seed: Some(rand::random()),
            ..self.settings
        };
        self.rebuild(settings);
    }

    /// Rebuilds the flock from the seed it was last built with.
    fn replay(&mut self) {
        self.rebuild(self.settings);
    }

    fn rebuild(&mut self, settings: SimSettings) {
        match Simulator::new(settings, self.cfg) {
            Ok(sim) => {
                info!(seed = ?sim.seed(), "flock rebuilt");
                self.settings = settings;
                self.sim = sim;
                self.config_error = None;
            }
            Err(e) => {
                warn!(error = %e, "flock rebuild rejected");
                self.config_error = Some(e.to_string());
            }
        }
        self.last_summary = StepSummary::default();
        self.running = false;
    }

    /// Advances the simulation by a single tick and records its summary.
    fn step_once(&mut self) {
        self.last_summary = self.sim.step();
    }

    /// Pushes the edited configuration into the simulator.
    ///
    /// If the simulator rejects it, the error is shown in the config panel
    /// and the simulator keeps running with its previous configuration.
    fn apply_config(&mut self) {
        match self.sim.set_config(self.cfg) {
            Ok(()) => self.config_error = None,
            Err(e) => {
                warn!(error = %e, "configuration rejected");
                self.config_error = Some(e.to_string());
            }
        }
    }

    fn arena_center(&self) -> DVec2 {
        let arena = self.sim.arena();
        DVec2::new(arena.width(), arena.height()) * 0.5
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The arena center is placed at the center of `rect`, scaled by `zoom`
    /// and offset by `pan`. The y-axis is flipped so that positive y goes up.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let local = (p - self.arena_center()).as_vec2();
        egui::pos2(
            center.x + local.x * self.zoom + self.pan.x,
            center.y - local.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] up to floating
    /// point rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        DVec2::new(x as f64, y as f64) + self.arena_center()
    }

    /// Helper to draw a labeled `f64` [`egui::DragValue`].
    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(
                egui::DragValue::new(value)
                    .range(range)
                    .speed(speed)
                    .max_decimals(6),
            );
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.01..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Replay").clicked() {
                    self.replay();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 5.0..=200.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (tick, seed, reflections, timing).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("tick = {}", self.sim.tick()));
                ui.label(format!("agents = {}", self.sim.agent_count()));
                if let Some(seed) = self.sim.seed() {
                    ui.label(format!("seed = {seed}"));
                }
                ui.separator();
                ui.label(format!(
                    "reflections = {}/{}",
                    self.last_summary.reflections_x, self.last_summary.reflections_y
                ));
                ui.label(format!(
                    "coincident pairs = {}",
                    self.last_summary.degenerate_pairs
                ));
            });
        });
    }

    /// Builds the right-hand configuration panel for rule parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        let before = self.cfg;
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Rule factors");
                Self::labeled_drag_f64(
                    ui,
                    "alignment:",
                    &mut self.cfg.alignment_factor,
                    0.0..=0.1,
                    1e-5,
                );
                Self::labeled_drag_f64(
                    ui,
                    "cohesion:",
                    &mut self.cfg.cohesion_factor,
                    0.0..=0.1,
                    1e-5,
                );
                Self::labeled_drag_f64(
                    ui,
                    "separation:",
                    &mut self.cfg.separation_factor,
                    0.0..=0.1,
                    1e-5,
                );

                ui.separator();
                ui.label("Neighbors");
                Self::labeled_drag_f64(
                    ui,
                    "separation_radius:",
                    &mut self.cfg.separation_radius,
                    0.0..=5.0,
                    0.01,
                );
                ui.checkbox(&mut self.cfg.include_self, "include self in means");

                ui.separator();
                ui.label("Update order");
                ui.radio_value(
                    &mut self.cfg.update_order,
                    UpdateOrder::Sequential,
                    "Sequential (live)",
                );
                ui.radio_value(
                    &mut self.cfg.update_order,
                    UpdateOrder::Synchronous,
                    "Synchronous (frozen)",
                );

                ui.separator();
                ui.label("Boundary margins");
                Self::labeled_drag_f64(ui, "x:", &mut self.cfg.boundary_margin.x, 0.0..=5.0, 0.01);
                Self::labeled_drag_f64(ui, "y:", &mut self.cfg.boundary_margin.y, 0.0..=5.0, 0.01);

                ui.separator();
                ui.label("Applied on reset");
                let mut count = self.settings.count;
                ui.horizontal(|ui| {
                    ui.label("agents:");
                    ui.add(egui::DragValue::new(&mut count).range(1..=5000).speed(1.0));
                });
                self.settings.count = count;
                Self::labeled_drag_f64(
                    ui,
                    "initial vx:",
                    &mut self.cfg.initial_velocity.x,
                    -1.0..=1.0,
                    1e-4,
                );
                Self::labeled_drag_f64(
                    ui,
                    "initial vy:",
                    &mut self.cfg.initial_velocity.y,
                    -1.0..=1.0,
                    1e-4,
                );

                if let Some(err) = &self.config_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });

        if self.cfg != before {
            self.apply_config();
        }
    }

    /// Builds the central panel where the arena and agents are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(5.0, 200.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Arena outline and reflection thresholds.
            let arena = *self.sim.arena();
            let (w, h) = (arena.width(), arena.height());
            let corners = [
                DVec2::new(0.0, 0.0),
                DVec2::new(w, 0.0),
                DVec2::new(w, h),
                DVec2::new(0.0, h),
            ];
            let outline: Vec<egui::Pos2> = corners
                .iter()
                .map(|&c| self.world_to_screen(c, rect))
                .collect();
            painter.add(egui::Shape::closed_line(
                outline,
                egui::Stroke::new(1.5, egui::Color32::GRAY),
            ));

            let t = arena.upper_threshold();
            let faint = egui::Stroke::new(1.0, egui::Color32::DARK_GRAY);
            painter.line_segment(
                [
                    self.world_to_screen(DVec2::new(t.x, 0.0), rect),
                    self.world_to_screen(DVec2::new(t.x, h), rect),
                ],
                faint,
            );
            painter.line_segment(
                [
                    self.world_to_screen(DVec2::new(0.0, t.y), rect),
                    self.world_to_screen(DVec2::new(w, t.y), rect),
                ],
                faint,
            );

            // Agents.
            let r = (0.08 * self.zoom).max(2.0);
            for p in self.sim.snapshot().iter() {
                painter.circle_filled(self.world_to_screen(p, rect), r, egui::Color32::GREEN);
            }

            // Flock centroid.
            let c = self.world_to_screen(self.sim.centroid(), rect);
            painter.circle_stroke(c, r * 1.5, egui::Stroke::new(1.0, egui::Color32::YELLOW));

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
