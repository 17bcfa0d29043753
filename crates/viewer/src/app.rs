//! Main application module

use eframe::egui;
use floorplan_viewer_lib::settings::ViewerSettings;

use crate::viewport::FloorPlanViewport;

/// Main application
pub struct FloorPlanApp {
    settings: ViewerSettings,
    viewport: FloorPlanViewport,
}

impl FloorPlanApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ViewerSettings, low_performance_mode: bool) -> Self {
        let mut viewport = FloorPlanViewport::new(low_performance_mode, settings.floor_plan.clone());

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        Self { settings, viewport }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let Some(session) = self.viewport.session() else {
                ui.weak("Not mounted");
                return;
            };
            let session = session.borrow();
            ui.weak(format!("Tier: {:?}", session.quality().tier));
            ui.separator();
            ui.weak(format!("Zoom: {:.2}×", session.camera().zoom));
            ui.separator();
            let lights = session.lighting();
            let on = lights.room_lights.iter().filter(|l| l.on).count();
            ui.weak(format!("Lights on: {on}/{}", lights.point_light_count()));
            ui.separator();
            ui.weak(format!("Frames drawn: {}", session.render_loop().frames_rendered()));
        });
    }

    fn light_panel(&self, ui: &mut egui::Ui) {
        ui.heading("Room lights");
        ui.add_space(4.0);
        let Some(session) = self.viewport.session() else {
            return;
        };
        let session = session.borrow();
        let lights = &session.lighting().room_lights;
        if lights.is_empty() {
            ui.weak("Point lights are off in low performance mode.");
            return;
        }
        for light in lights {
            ui.horizontal(|ui| {
                let [r, g, b] = light.color.map(|c| (c * 255.0) as u8);
                let swatch = if light.on {
                    egui::Color32::from_rgb(r, g, b)
                } else {
                    egui::Color32::from_gray(90)
                };
                ui.colored_label(swatch, "●");
                ui.label(&light.name);
                ui.weak(if light.on { "on" } else { "off" });
            });
        }
        ui.add_space(8.0);
        ui.weak("Click a ceiling fixture to toggle its light.");
    }
}

impl eframe::App for FloorPlanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .show(ctx, |ui| self.status_bar(ui));

        // ── Right panel: light status ────────────────────────
        if self.settings.show_light_panel {
            egui::SidePanel::right("lights")
                .default_width(200.0)
                .resizable(true)
                .show(ctx, |ui| self.light_panel(ui));
        }

        // ── Central viewport ─────────────────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| self.viewport.show(ui));
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.viewport.destroy(gl);
        self.settings.save();
        tracing::info!("viewer closed");
    }
}
