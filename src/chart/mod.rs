/// Chart layer: turning a filtered view into something drawable.
///
/// `spec` holds the renderer-agnostic chart descriptions, `select`
/// composes them from the dataset and view, and `text` derives the
/// summary line and the dynamic headline. Nothing in here knows about
/// egui; the UI layer only consumes the composed specs.

pub mod select;
pub mod spec;
pub mod text;

pub use select::render;
pub use spec::{
    ChartSpec, SankeyLink, SankeySpec, ScatterPoint, ScatterSpec, TimelineFrame, TimelineSpec,
    VizMode,
};
pub use text::{headline, summary, HEADLINE_PLACEHOLDER};
