use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::model::Field;
use crate::profile::PROFILES;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel for the active profile.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Snapshot what the widgets read so the loop can call &mut state.
    let profile = state.profile;
    let options: Vec<(Field, Vec<String>)> = profile
        .category_filters
        .iter()
        .map(|&field| {
            let values = state
                .dataset
                .as_ref()
                .and_then(|ds| ds.distinct_values(field))
                .map(|set| set.iter().map(|v| v.to_string()).collect())
                .unwrap_or_default();
            (field, values)
        })
        .collect();
    let age_span = state
        .dataset
        .as_ref()
        .map(|ds| profile.age_span(ds))
        .unwrap_or(profile.age_default);
    let income_span = state
        .dataset
        .as_ref()
        .map(|ds| profile.income_span(ds))
        .unwrap_or(profile.income_default);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (field, values) in &options {
                category_filter(ui, state, *field, values);
            }

            if profile.modified_filter {
                modified_filter(ui, state);
            }

            ui.separator();
            range_filter(ui, state, Field::Age, age_span);
            range_filter(ui, state, Field::Income, income_span);

            if profile.modes.len() > 1 {
                ui.separator();
                mode_selector(ui, state);
            }
        });
}

/// Collapsible checkbox list for one categorical dimension. An empty
/// selection means the dimension does not constrain at all.
fn category_filter(ui: &mut Ui, state: &mut AppState, field: Field, values: &[String]) {
    let n_selected = state
        .criteria
        .selection(field)
        .map(|s| s.len())
        .unwrap_or(0);
    let header_text = format!("{}  ({}/{})", field.label(), n_selected, values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(field.column())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(field);
                }
                if ui.small_button("Clear").clicked() {
                    state.clear_selection(field);
                }
            });

            let color_field = state.color_map.as_ref().map(|cm| cm.field);
            for value in values {
                let is_selected = state
                    .criteria
                    .selection(field)
                    .is_some_and(|s| s.contains(value));

                // Swatch the values of the colour-encoded field.
                let mut text = RichText::new(value);
                if color_field == Some(field) {
                    if let Some(cm) = &state.color_map {
                        text = text.color(cm.color_for(value));
                    }
                }

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_filter_value(field, value);
                }
            }
        });
}

/// Yes/No/All radio for the modified flag.
fn modified_filter(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.strong(Field::Modified.label());
    let mut choice = state.criteria.modified;
    let changed = ui.radio_value(&mut choice, None, "All").changed()
        | ui.radio_value(&mut choice, Some(true), "Yes").changed()
        | ui.radio_value(&mut choice, Some(false), "No").changed();
    if changed {
        state.set_modified(choice);
    }
}

/// Min/max sliders for one numeric range dimension. The state layer
/// rejects an inverted pair, so dragging min past max leaves the previous
/// range in force and shows a status message.
fn range_filter(ui: &mut Ui, state: &mut AppState, field: Field, span: (f64, f64)) {
    // Age and income are the only range dimensions; anything else renders
    // nothing rather than aliasing onto one of them.
    let range = match field {
        Field::Age => state.criteria.age,
        Field::Income => state.criteria.income,
        _ => return,
    };
    let step = if field == Field::Income { 1000.0 } else { 1.0 };

    ui.add_space(4.0);
    ui.strong(field.label());
    let mut min = range.min;
    let mut max = range.max;
    let changed = ui
        .add(
            Slider::new(&mut min, span.0..=span.1)
                .integer()
                .step_by(step)
                .text("min"),
        )
        .changed()
        | ui.add(
            Slider::new(&mut max, span.0..=span.1)
                .integer()
                .step_by(step)
                .text("max"),
        )
        .changed();

    if changed {
        match field {
            Field::Age => state.set_age_range(min, max),
            Field::Income => state.set_income_range(min, max),
            _ => {}
        }
    }
}

/// Chart-mode combo, shown only when the profile offers a choice.
fn mode_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Chart");
    let current = state.mode;
    egui::ComboBox::from_id_salt("viz_mode")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for &mode in state.profile.modes {
                if ui.selectable_label(current == mode, mode.label()).clicked() {
                    state.set_mode(mode);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.chart.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export chart JSON…"))
                .clicked()
            {
                export_chart_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        egui::ComboBox::from_id_salt("profile")
            .selected_text(state.profile.name)
            .show_ui(ui, |ui: &mut Ui| {
                for profile in PROFILES {
                    let active = std::ptr::eq(state.profile, profile);
                    if ui.selectable_label(active, profile.name).clicked() {
                        state.set_profile(profile);
                    }
                }
            });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} owners loaded, {} matching",
                ds.len(),
                state.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open owner data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_chart_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart spec")
        .set_file_name("chart.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.export_chart(&path) {
            Ok(()) => {
                log::info!("exported chart spec to {}", path.display());
                state.status_message = Some(format!("Exported chart to {}", path.display()));
            }
            Err(e) => {
                log::error!("chart export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
