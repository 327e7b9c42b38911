use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, widget};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FilterBuilderApp {
    pub state: AppState,
}

impl FilterBuilderApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for FilterBuilderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: catalog ----
        egui::SidePanel::left("catalog_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state);
            });

        // ---- Central panel: widget + consumer output ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.state;
            widget::filter_widget(ui, &mut state.builder, &state.colors);
            ui.add_space(12.0);
            panels::output_panel(ui, state);
        });
    }
}
