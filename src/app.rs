use std::path::Path;

use eframe::egui;

use crate::data::synth::DEFAULT_DATASET_FILE;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CarscopeApp {
    pub state: AppState,
}

impl CarscopeApp {
    /// App with the generator's default output loaded, when it sits in the
    /// working directory. Otherwise the user opens a file via the menu.
    pub fn with_default_dataset() -> Self {
        let mut app = Self::default();
        let path = Path::new(DEFAULT_DATASET_FILE);
        if path.exists() {
            app.state.load_path(path);
        }
        app
    }
}

impl eframe::App for CarscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(230.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_panel(ui, &mut self.state);
        });
    }
}
