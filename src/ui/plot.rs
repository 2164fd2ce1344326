use std::collections::{BTreeMap, BTreeSet, HashMap};

use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Legend, MarkerShape, Plot, PlotPoint, PlotResponse, PlotUi, Points, Polygon, Text,
};

use crate::chart::{ChartSpec, SankeySpec, ScatterPoint, ScatterSpec, TimelineSpec};
use crate::color::{generate_palette, ColorMap};
use crate::data::model::Field;
use crate::state::AppState;

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 8.0;
const DEFAULT_RADIUS: f32 = 3.0;

/// Seconds between automatic timeline steps.
const FRAME_SECONDS: f64 = 0.8;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the composed chart with heading, headline and summary line.
pub fn chart_panel(ui: &mut Ui, state: &mut AppState) {
    if state.chart.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore owners  (File → Open…)");
        });
        return;
    }

    ui.heading(state.profile.heading);
    if let Some(headline) = &state.headline {
        ui.label(RichText::new(headline).italics());
    }
    ui.add_space(4.0);

    let mut timeline_change: Option<(usize, bool)> = None;
    if let Some(chart) = &state.chart {
        if !chart.title().is_empty() {
            ui.strong(chart.title());
        }
        match chart {
            ChartSpec::Scatter(spec) => scatter_chart(ui, spec, state.color_map.as_ref()),
            ChartSpec::Sankey(spec) => sankey_chart(ui, spec),
            ChartSpec::Timeline(spec) => {
                timeline_change = timeline_chart(
                    ui,
                    spec,
                    state.timeline_frame,
                    state.timeline_playing,
                    state.color_map.as_ref(),
                );
            }
        }
    }
    if let Some((frame, playing)) = timeline_change {
        state.timeline_frame = frame;
        state.set_timeline_playing(playing, ui.input(|i| i.time));
    }
    advance_timeline(ui, state);

    ui.add_space(4.0);
    ui.label(&state.summary);
}

/// Step the playing timeline on the egui clock.
fn advance_timeline(ui: &Ui, state: &mut AppState) {
    if !state.timeline_playing {
        return;
    }
    let now = ui.input(|i| i.time);
    if now - state.timeline_last_step >= FRAME_SECONDS {
        state.step_timeline();
        state.timeline_last_step = now;
    }
    ui.ctx()
        .request_repaint_after(std::time::Duration::from_millis(100));
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, spec: &ScatterSpec, color_map: Option<&ColorMap>) {
    let height = plot_height(ui);
    let response = Plot::new("owner_scatter")
        .legend(Legend::default())
        .x_axis_label(spec.x_field.label())
        .y_axis_label(spec.y_field.label())
        .height(height)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_markers(plot_ui, &spec.points, color_map);
        });
    hover_tooltip(ui, &response, &spec.points);
}

/// One `Points` item per marker so each can carry its own radius and
/// shape; the legend collapses items sharing a name.
fn plot_markers(plot_ui: &mut PlotUi, points: &[ScatterPoint], color_map: Option<&ColorMap>) {
    let domain = size_domain(points);
    let shapes = symbol_shapes(points);

    for point in points {
        let mut marker = Points::new(vec![[point.x, point.y]])
            .radius(radius_for(point.size, domain))
            .filled(true);
        if let Some(key) = &point.color_key {
            if let Some(cm) = color_map {
                marker = marker.color(cm.color_for(key));
            }
            marker = marker.name(key);
        }
        if let Some(shape) = point
            .symbol_key
            .as_deref()
            .and_then(|key| shapes.get(key))
        {
            marker = marker.shape(*shape);
        }
        plot_ui.points(marker);
    }
}

fn size_domain(points: &[ScatterPoint]) -> Option<(f64, f64)> {
    let mut domain: Option<(f64, f64)> = None;
    for size in points.iter().filter_map(|p| p.size) {
        domain = Some(match domain {
            Some((lo, hi)) => (lo.min(size), hi.max(size)),
            None => (size, size),
        });
    }
    domain
}

fn radius_for(size: Option<f64>, domain: Option<(f64, f64)>) -> f32 {
    match (size, domain) {
        (Some(v), Some((lo, hi))) if hi > lo => {
            MIN_RADIUS + (((v - lo) / (hi - lo)) as f32) * (MAX_RADIUS - MIN_RADIUS)
        }
        (Some(_), Some(_)) => (MIN_RADIUS + MAX_RADIUS) / 2.0,
        _ => DEFAULT_RADIUS,
    }
}

const SHAPES: [MarkerShape; 10] = [
    MarkerShape::Circle,
    MarkerShape::Diamond,
    MarkerShape::Square,
    MarkerShape::Cross,
    MarkerShape::Plus,
    MarkerShape::Up,
    MarkerShape::Down,
    MarkerShape::Left,
    MarkerShape::Right,
    MarkerShape::Asterisk,
];

/// Deterministic symbol assignment over the categories present in the
/// spec, in sorted order.
fn symbol_shapes(points: &[ScatterPoint]) -> BTreeMap<&str, MarkerShape> {
    points
        .iter()
        .filter_map(|p| p.symbol_key.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, key)| (key, SHAPES[i % SHAPES.len()]))
        .collect()
}

/// Tooltip with the hover fields of the marker nearest the pointer.
fn hover_tooltip(ui: &Ui, response: &PlotResponse<()>, points: &[ScatterPoint]) {
    let Some(pointer) = response.response.hover_pos() else {
        return;
    };

    let mut nearest: Option<(f32, &ScatterPoint)> = None;
    for point in points {
        let pos = response
            .transform
            .position_from_point(&PlotPoint::new(point.x, point.y));
        let distance = pos.distance(pointer);
        if distance <= 12.0 && nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, point));
        }
    }

    let Some((_, point)) = nearest else {
        return;
    };
    if point.hover.is_empty() {
        return;
    }
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new("owner_hover"),
        |ui: &mut Ui| {
            for (field, value) in &point.hover {
                ui.label(format!("{}: {}", field.label(), value));
            }
        },
    );
}

// ---------------------------------------------------------------------------
// Sankey
// ---------------------------------------------------------------------------

/// Draw the flow diagram on a unit-square plot: node bars left and right,
/// one ribbon per aggregated gender→body-style flow, widths proportional
/// to flow.
fn sankey_chart(ui: &mut Ui, spec: &SankeySpec) {
    let height = plot_height(ui);
    let plot = Plot::new("owner_sankey")
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.18)
        .include_x(1.18)
        .include_y(-0.02)
        .include_y(1.02)
        .height(height);

    plot.show(ui, |plot_ui| {
        if spec.links.is_empty() {
            return;
        }
        draw_sankey(plot_ui, spec);
    });
}

fn draw_sankey(plot_ui: &mut PlotUi, spec: &SankeySpec) {
    // Aggregate unit links into flows, first-seen order.
    let mut flows: Vec<((usize, usize), f64)> = Vec::new();
    let mut flow_index: HashMap<(usize, usize), usize> = HashMap::new();
    for link in &spec.links {
        let key = (link.source, link.target);
        match flow_index.get(&key) {
            Some(&i) => flows[i].1 += link.value,
            None => {
                flow_index.insert(key, flows.len());
                flows.push((key, link.value));
            }
        }
    }

    let mut out_total: HashMap<usize, f64> = HashMap::new();
    let mut in_total: HashMap<usize, f64> = HashMap::new();
    let mut sources: Vec<usize> = Vec::new();
    let mut targets: Vec<usize> = Vec::new();
    let mut total_flow = 0.0;
    for &((source, target), value) in &flows {
        if !out_total.contains_key(&source) {
            sources.push(source);
        }
        if !in_total.contains_key(&target) {
            targets.push(target);
        }
        *out_total.entry(source).or_default() += value;
        *in_total.entry(target).or_default() += value;
        total_flow += value;
    }
    if total_flow <= 0.0 {
        return;
    }

    // Both columns carry the same total, so they share one scale.
    let gap = 0.02;
    let max_gaps = gap * (sources.len().max(targets.len()).saturating_sub(1)) as f64;
    let scale = (1.0 - max_gaps) / total_flow;

    let left = stack_column(&sources, &out_total, scale, gap);
    let right = stack_column(&targets, &in_total, scale, gap);

    let palette = generate_palette(spec.labels.len());

    const LEFT_X: (f64, f64) = (0.0, 0.03);
    const RIGHT_X: (f64, f64) = (0.97, 1.0);

    // Ribbons first so node bars draw over their ends.
    let mut out_filled: HashMap<usize, f64> = HashMap::new();
    let mut in_filled: HashMap<usize, f64> = HashMap::new();
    for &((source, target), value) in &flows {
        let (s_bottom, s_height) = left[&source];
        let (t_bottom, t_height) = right[&target];
        let s_off = out_filled.entry(source).or_insert(0.0);
        let s_top = s_bottom + s_height - *s_off;
        let s_bot = s_top - value * scale;
        *s_off += value * scale;
        let t_off = in_filled.entry(target).or_insert(0.0);
        let t_top = t_bottom + t_height - *t_off;
        let t_bot = t_top - value * scale;
        *t_off += value * scale;

        let color = node_fill(&palette, source);
        let ribbon = Polygon::new(vec![
            [LEFT_X.1, s_top],
            [LEFT_X.1, s_bot],
            [RIGHT_X.0, t_bot],
            [RIGHT_X.0, t_top],
        ])
        .fill_color(Color32::from_rgba_unmultiplied(
            color.r(),
            color.g(),
            color.b(),
            90,
        ))
        .stroke(Stroke::NONE);
        plot_ui.polygon(ribbon);
    }

    // Node bars and labels, one pass per side.
    draw_node_bars(plot_ui, spec, &sources, &left, LEFT_X, Align2::RIGHT_CENTER, &palette);
    draw_node_bars(plot_ui, spec, &targets, &right, RIGHT_X, Align2::LEFT_CENTER, &palette);
}

fn draw_node_bars(
    plot_ui: &mut PlotUi,
    spec: &SankeySpec,
    nodes: &[usize],
    column: &HashMap<usize, (f64, f64)>,
    x: (f64, f64),
    anchor: Align2,
    palette: &[Color32],
) {
    let label_x = if anchor == Align2::RIGHT_CENTER {
        x.0 - 0.02
    } else {
        x.1 + 0.02
    };

    for &label in nodes {
        let (bottom, node_height) = column[&label];
        let bar = Polygon::new(vec![
            [x.0, bottom],
            [x.1, bottom],
            [x.1, bottom + node_height],
            [x.0, bottom + node_height],
        ])
        .fill_color(node_fill(palette, label))
        .stroke(Stroke::NONE);
        plot_ui.polygon(bar);

        if let Some(text) = spec.labels.get(label) {
            plot_ui.text(
                Text::new(
                    PlotPoint::new(label_x, bottom + node_height / 2.0),
                    RichText::new(text).strong(),
                )
                .anchor(anchor),
            );
        }
    }
}

fn node_fill(palette: &[Color32], label: usize) -> Color32 {
    palette.get(label).copied().unwrap_or(Color32::GRAY)
}

/// Stack a column of nodes from the top of the unit square; returns
/// node → (bottom y, height).
fn stack_column(
    nodes: &[usize],
    totals: &HashMap<usize, f64>,
    scale: f64,
    gap: f64,
) -> HashMap<usize, (f64, f64)> {
    let mut layout = HashMap::new();
    let mut y = 1.0;
    for &node in nodes {
        let height = totals.get(&node).copied().unwrap_or(0.0) * scale;
        y -= height;
        layout.insert(node, (y, height));
        y -= gap;
    }
    layout
}

// ---------------------------------------------------------------------------
// Animated timeline
// ---------------------------------------------------------------------------

/// Frame controls plus the current frame's scatter. Returns the changed
/// (frame, playing) pair when the user touched the controls.
fn timeline_chart(
    ui: &mut Ui,
    spec: &TimelineSpec,
    frame: usize,
    playing: bool,
    color_map: Option<&ColorMap>,
) -> Option<(usize, bool)> {
    if spec.frames.is_empty() {
        ui.label("No records match the current filters.");
        return None;
    }

    let mut frame = frame.min(spec.frames.len() - 1);
    let mut playing = playing;
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        let label = if playing { "⏸ Pause" } else { "▶ Play" };
        if ui.button(label).clicked() {
            playing = !playing;
            changed = true;
        }
        if ui
            .add(egui::Slider::new(&mut frame, 0..=spec.frames.len() - 1).text("frame"))
            .changed()
        {
            changed = true;
        }
        ui.label(format!("car age {}", spec.frames[frame].car_age));
    });

    // Fixed axes over the whole animation keep the frames comparable.
    let (x_bounds, y_bounds) = timeline_bounds(spec);
    let height = plot_height(ui);
    let points = &spec.frames[frame].points;
    let response = Plot::new("owner_timeline")
        .legend(Legend::default())
        .x_axis_label(Field::CarAge.label())
        .y_axis_label(Field::NumberOfOwners.label())
        .include_x(x_bounds.0)
        .include_x(x_bounds.1)
        .include_y(y_bounds.0)
        .include_y(y_bounds.1)
        .height(height)
        .show(ui, |plot_ui| {
            plot_markers(plot_ui, points, color_map);
        });
    hover_tooltip(ui, &response, points);

    changed.then_some((frame, playing))
}

fn timeline_bounds(spec: &TimelineSpec) -> ((f64, f64), (f64, f64)) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for point in spec.frames.iter().flat_map(|f| &f.points) {
        x = (x.0.min(point.x), x.1.max(point.x));
        y = (y.0.min(point.y), y.1.max(point.y));
    }
    if x.0 > x.1 {
        return ((0.0, 1.0), (0.0, 1.0));
    }
    // A margin so markers at the edge stay visible.
    ((x.0 - 1.0, x.1 + 1.0), (0.0, y.1 + 1.0))
}

fn plot_height(ui: &Ui) -> f32 {
    (ui.available_height() - 28.0).max(120.0)
}
