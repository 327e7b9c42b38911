use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::catalog::{display_label, infer_domain, RESERVED_KEY};
use crate::data::predicate::encode_filters;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – catalog overview
// ---------------------------------------------------------------------------

/// Render the left catalog panel.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Attributes");
    ui.separator();

    let catalog = state.builder.possible_filters();
    if catalog.is_empty() {
        ui.label("No catalog loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (key, values) in catalog.iter() {
                let domain = infer_domain(values);
                let mut header = RichText::new(format!(
                    "{}  ({domain}, {})",
                    display_label(key),
                    values.len()
                ))
                .strong();
                if key == RESERVED_KEY {
                    header = header.weak();
                }

                egui::CollapsingHeader::new(header)
                    .id_salt(key)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if key == RESERVED_KEY {
                            ui.label(RichText::new("hidden from the attribute picker").italics());
                        }
                        for value in values {
                            ui.label(value);
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – what the consumer received
// ---------------------------------------------------------------------------

/// Render the last filter set handed to the consumer.
pub fn output_panel(ui: &mut Ui, state: &AppState) {
    ui.strong("Consumer received");
    ui.separator();

    let received = state.received.borrow();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Query:");
        ui.monospace(encode_filters(&received));
    });

    match state.received_json() {
        Ok(json) => {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.monospace(json);
                });
        }
        Err(e) => {
            ui.label(RichText::new(format!("Error: {e:#}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open catalog…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let catalog = state.builder.possible_filters();
        if !catalog.is_empty() {
            let source = state
                .catalog_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}  {} attributes, {} filters active",
                catalog.len(),
                state.builder.filters().len()
            ));
        }

        ui.separator();

        if ui
            .selectable_label(state.builder.visible, "Show filter")
            .clicked()
        {
            state.builder.visible = !state.builder.visible;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open attribute catalog")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_catalog(&path);
    }
}
