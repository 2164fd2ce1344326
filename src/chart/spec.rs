use serde::Serialize;

use crate::data::model::Field;

// ---------------------------------------------------------------------------
// VizMode – the chart-type selector
// ---------------------------------------------------------------------------

/// The chart types a profile can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VizMode {
    Scatter,
    Sankey,
    Timeline,
}

impl VizMode {
    pub const ALL: [VizMode; 3] = [VizMode::Scatter, VizMode::Sankey, VizMode::Timeline];

    /// Selector token.
    pub fn token(self) -> &'static str {
        match self {
            VizMode::Scatter => "scatter",
            VizMode::Sankey => "sankey",
            VizMode::Timeline => "timeline",
        }
    }

    /// Resolve a selector token. Unknown tokens yield `None`, which the
    /// renderer turns into the bare fallback scatter.
    pub fn parse(token: &str) -> Option<VizMode> {
        VizMode::ALL.into_iter().find(|m| m.token() == token)
    }

    /// Label for the mode combo box.
    pub fn label(self) -> &'static str {
        match self {
            VizMode::Scatter => "Scatter plot",
            VizMode::Sankey => "Sankey diagram",
            VizMode::Timeline => "Animated timeline",
        }
    }
}

// ---------------------------------------------------------------------------
// Chart specs – fully materialized, renderer-agnostic
// ---------------------------------------------------------------------------

/// One scatter marker with every encoding already resolved, so renderers
/// (and the JSON export) never touch the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Value driving the marker radius, when the mapping has a size encoding.
    pub size: Option<f64>,
    /// Category deciding the marker color.
    pub color_key: Option<String>,
    /// Category deciding the marker shape.
    pub symbol_key: Option<String>,
    /// Field/value pairs for the hover tooltip, in mapping order.
    pub hover: Vec<(Field, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x_field: Field,
    pub y_field: Field,
    pub color_field: Option<Field>,
    pub size_field: Option<Field>,
    pub symbol_field: Option<Field>,
    pub points: Vec<ScatterPoint>,
}

/// One unit of flow between two sankey nodes. `source` and `target` index
/// the owning spec's label list and carry no meaning beyond it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeySpec {
    pub title: String,
    /// Node labels in first-seen order; sources before targets.
    pub labels: Vec<String>,
    /// One link per filtered row, in row order.
    pub links: Vec<SankeyLink>,
}

/// The points of one animation step.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineFrame {
    pub car_age: u32,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineSpec {
    pub title: String,
    pub color_field: Option<Field>,
    /// Frames in ascending car-age order.
    pub frames: Vec<TimelineFrame>,
}

/// A fully composed chart. Everything a renderer needs is inside; the spec
/// also serializes to JSON for external renderers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChartSpec {
    Scatter(ScatterSpec),
    Sankey(SankeySpec),
    Timeline(TimelineSpec),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Scatter(s) => &s.title,
            ChartSpec::Sankey(s) => &s.title,
            ChartSpec::Timeline(s) => &s.title,
        }
    }

    /// Whether the spec carries any data at all (empty views compose empty
    /// charts, never errors).
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Scatter(s) => s.points.is_empty(),
            ChartSpec::Sankey(s) => s.links.is_empty(),
            ChartSpec::Timeline(s) => s.frames.is_empty(),
        }
    }
}
