use eframe::egui::{self, Color32, RichText, Ui};

use crate::builder::{Action, FilterBuilder, Selection};
use crate::color::BubbleColors;
use crate::data::catalog::{display_label, DomainKind};
use crate::data::predicate::{Comparison, Predicate};

// ---------------------------------------------------------------------------
// Filter builder widget
// ---------------------------------------------------------------------------

/// Render the filter widget: active filter bubbles on top, the
/// attribute → comparison → value pickers below.
///
/// Interactions are collected while drawing and dispatched afterwards, so
/// the builder is only mutated once the frame's widgets are laid out.
pub fn filter_widget(ui: &mut Ui, builder: &mut FilterBuilder, colors: &BubbleColors) {
    if !builder.visible {
        return;
    }

    let mut actions: Vec<Action> = Vec::new();

    active_filter_bubbles(ui, builder.filters(), colors, &mut actions);
    ui.add_space(6.0);

    ui.horizontal_wrapped(|ui: &mut Ui| {
        attribute_picker(ui, builder, &mut actions);
        if let Some(selection) = builder.selection() {
            comparison_picker(ui, selection, &mut actions);
        }
    });

    if let Some(selection) = builder.selection() {
        value_picker(ui, selection, builder, &mut actions);
    }

    for action in actions {
        builder.dispatch(action);
    }
}

// ---------------------------------------------------------------------------
// Bubbles
// ---------------------------------------------------------------------------

fn active_filter_bubbles(
    ui: &mut Ui,
    filters: &[Predicate],
    colors: &BubbleColors,
    actions: &mut Vec<Action>,
) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for filter in filters {
            egui::Frame::group(ui.style())
                .fill(colors.color_for(filter.key_name()))
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(RichText::new(filter.summary()).color(Color32::WHITE));
                        if ui.small_button("✕").on_hover_text("Remove filter").clicked() {
                            actions.push(Action::Remove(filter.id()));
                        }
                    });
                });
        }
    });
}

// ---------------------------------------------------------------------------
// Pickers
// ---------------------------------------------------------------------------

fn attribute_picker(ui: &mut Ui, builder: &FilterBuilder, actions: &mut Vec<Action>) {
    ui.label("Filter:");
    let current = builder
        .selection()
        .map(|s| display_label(&s.attribute))
        .unwrap_or_else(|| "select attribute".to_string());

    egui::ComboBox::from_id_salt("filter_attribute")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            let selected = builder.selection().map(|s| s.attribute.as_str());
            for key in builder.possible_filters().pickable_keys() {
                if ui
                    .selectable_label(selected == Some(key), display_label(key))
                    .clicked()
                {
                    actions.push(Action::SelectAttribute(key.to_string()));
                }
            }
        });
}

fn comparison_picker(ui: &mut Ui, selection: &Selection, actions: &mut Vec<Action>) {
    if selection.domain != DomainKind::Numeric {
        ui.label(Comparison::OneOf.label());
        return;
    }

    egui::ComboBox::from_id_salt("filter_comparison")
        .selected_text(selection.comparison.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in Comparison::ALL {
                if ui
                    .selectable_label(selection.comparison == kind, kind.label())
                    .clicked()
                {
                    actions.push(Action::SetComparison(kind));
                }
            }
        });
}

fn value_picker(
    ui: &mut Ui,
    selection: &Selection,
    builder: &FilterBuilder,
    actions: &mut Vec<Action>,
) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        if selection.comparison.is_threshold() {
            let mut text = selection.threshold.clone();
            let edit = ui.add(egui::TextEdit::singleline(&mut text).desired_width(80.0));
            if edit.changed() {
                actions.push(Action::SetThreshold(text));
            }
            if let Err(e) = selection.threshold_status() {
                let hint = if builder.strict_thresholds {
                    e.to_string()
                } else {
                    format!("{e}, will be sent as NaN")
                };
                ui.colored_label(Color32::from_rgb(0xC0, 0x60, 0x20), hint);
            }
        } else {
            let n_selected = selection.included.len();
            let header = format!("select value  ({n_selected}/{})", selection.values.len());
            egui::CollapsingHeader::new(header)
                .id_salt(("filter_values", selection.attribute.as_str()))
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for value in &selection.values {
                        let mut checked = selection.is_included(value);
                        if ui.checkbox(&mut checked, display_label(value)).changed() {
                            actions.push(Action::ToggleValue(value.clone()));
                        }
                    }
                });
        }

        if builder.stage().is_ready() && ui.button("Add").clicked() {
            actions.push(Action::Commit);
        }
    });
}
