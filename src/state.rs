use std::path::Path;

use anyhow::Context;
use log::{error, info, warn};

use crate::chart::{self, ChartSpec, VizMode};
use crate::color::ColorMap;
use crate::data::filter::{apply, FilterCriteria, FilteredView, RangeFilter};
use crate::data::loader::load_file;
use crate::data::model::{Field, OwnerDataset};
use crate::profile::{DashboardProfile, OWNERSHIP_EXPLORER};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
///
/// Every interaction funnels through a method here, and every mutating
/// method ends in the same recompute pipeline: `refilter` rebuilds the
/// view from the criteria, `recompose` rebuilds chart, summary and
/// headline from the view. The UI layer only reads the results.
pub struct AppState {
    /// Dataset exactly as loaded from the file (None until a load).
    pub loaded: Option<OwnerDataset>,

    /// What the active profile operates on; differs from `loaded` when
    /// the profile sub-samples.
    pub dataset: Option<OwnerDataset>,

    /// Active dashboard variant.
    pub profile: &'static DashboardProfile,

    /// Current filter criteria, always valid.
    pub criteria: FilterCriteria,

    /// Selected chart mode.
    pub mode: VizMode,

    /// Rows passing the current criteria.
    pub view: FilteredView,

    /// Chart composed for the current view and mode.
    pub chart: Option<ChartSpec>,

    /// Record-count line under the chart.
    pub summary: String,

    /// Criteria-derived headline, for profiles that show one.
    pub headline: Option<String>,

    /// Colour map for the chart's colour encoding.
    pub color_map: Option<ColorMap>,

    /// Frame the timeline renderer currently shows.
    pub timeline_frame: usize,

    /// Whether the timeline advances on its own.
    pub timeline_playing: bool,

    /// Wall-clock (egui time) of the last automatic frame step.
    pub timeline_last_step: f64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let profile = &OWNERSHIP_EXPLORER;
        Self {
            loaded: None,
            dataset: None,
            profile,
            criteria: FilterCriteria::unconstrained(),
            mode: profile.default_mode(),
            view: FilteredView::default(),
            chart: None,
            summary: String::new(),
            headline: None,
            color_map: None,
            timeline_frame: 0,
            timeline_playing: false,
            timeline_last_step: 0.0,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Load a dataset file and make it the active one. Failures leave the
    /// previous dataset in place and surface a status message.
    pub fn load_path(&mut self, path: &Path) {
        self.loading = true;
        match load_file(path) {
            Ok(dataset) => {
                info!(
                    "loaded {} owner records from {}",
                    dataset.len(),
                    path.display()
                );
                self.set_dataset(dataset);
            }
            Err(err) => {
                error!("loading {} failed: {err}", path.display());
                self.status_message = Some(format!("Failed to load {}: {err}", path.display()));
                self.loading = false;
            }
        }
    }

    /// Ingest a loaded dataset and re-derive everything for the active
    /// profile.
    pub fn set_dataset(&mut self, dataset: OwnerDataset) {
        self.loaded = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.reset_for_profile();
    }

    /// Switch dashboard variants. The operating dataset, criteria and
    /// mode are all re-derived from the loaded file.
    pub fn set_profile(&mut self, profile: &'static DashboardProfile) {
        if std::ptr::eq(self.profile, profile) {
            return;
        }
        self.profile = profile;
        self.reset_for_profile();
    }

    fn reset_for_profile(&mut self) {
        self.mode = self.profile.default_mode();
        self.timeline_frame = 0;
        self.timeline_playing = false;

        match &self.loaded {
            Some(loaded) => {
                let operating = self.profile.operating_dataset(loaded);
                self.criteria = self.profile.initial_criteria(&operating);
                self.dataset = Some(operating);
            }
            None => {
                self.criteria = FilterCriteria::unconstrained();
                self.dataset = None;
            }
        }
        self.refilter();
    }

    /// Recompute the view after a criteria change, then everything
    /// downstream of it.
    pub fn refilter(&mut self) {
        self.view = match &self.dataset {
            Some(dataset) => apply(dataset, &self.criteria),
            None => FilteredView::default(),
        };
        self.recompose();
    }

    /// Re-run the pure composition pipeline for the current view and mode.
    fn recompose(&mut self) {
        let Some(dataset) = &self.dataset else {
            self.chart = None;
            self.summary.clear();
            self.headline = None;
            self.color_map = None;
            return;
        };

        let chart = chart::render(dataset, &self.view, Some(self.mode), self.profile);

        self.color_map = match &chart {
            ChartSpec::Scatter(spec) => spec
                .color_field
                .map(|field| ColorMap::for_field(dataset, field)),
            ChartSpec::Timeline(spec) => spec
                .color_field
                .map(|field| ColorMap::for_field(dataset, field)),
            // Sankey nodes are paletted over the label list by the renderer.
            ChartSpec::Sankey(_) => None,
        };
        self.summary = chart::summary(self.view.len(), dataset.len());
        self.headline = self.profile.dynamic_headline.then(|| {
            chart::headline(
                &self.criteria,
                self.profile.age_span(dataset),
                self.profile.income_span(dataset),
            )
        });
        if let ChartSpec::Timeline(spec) = &chart {
            self.timeline_frame = self
                .timeline_frame
                .min(spec.frames.len().saturating_sub(1));
        }
        self.chart = Some(chart);
    }

    // -- Filter interactions -------------------------------------------------

    /// Flip a single value in a dimension's accepted set.
    pub fn toggle_filter_value(&mut self, field: Field, value: &str) {
        self.criteria.toggle_value(field, value);
        self.refilter();
    }

    /// Tick every observed value of the dimension.
    pub fn select_all(&mut self, field: Field) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let values: Vec<String> = dataset
            .distinct_values(field)
            .map(|set| set.iter().map(|v| v.to_string()).collect())
            .unwrap_or_default();
        self.criteria.select_all(field, values);
        self.refilter();
    }

    /// Untick every value of the dimension (back to "no constraint").
    pub fn clear_selection(&mut self, field: Field) {
        self.criteria.clear_selection(field);
        self.refilter();
    }

    pub fn set_modified(&mut self, modified: Option<bool>) {
        self.criteria.modified = modified;
        self.refilter();
    }

    pub fn set_age_range(&mut self, min: f64, max: f64) {
        let mut candidate = self.criteria.clone();
        candidate.age = RangeFilter::new(min, max);
        self.apply_criteria(candidate);
    }

    pub fn set_income_range(&mut self, min: f64, max: f64) {
        let mut candidate = self.criteria.clone();
        candidate.income = RangeFilter::new(min, max);
        self.apply_criteria(candidate);
    }

    /// Validate and adopt candidate criteria. Invalid candidates are
    /// rejected and the previous criteria stay in force.
    fn apply_criteria(&mut self, candidate: FilterCriteria) {
        match candidate.validate() {
            Ok(()) => {
                self.criteria = candidate;
                self.status_message = None;
                self.refilter();
            }
            Err(err) => {
                warn!("rejected filter change: {err}");
                self.status_message = Some(err.to_string());
            }
        }
    }

    // -- Chart interactions --------------------------------------------------

    pub fn set_mode(&mut self, mode: VizMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.timeline_frame = 0;
        self.timeline_playing = false;
        self.recompose();
    }

    /// Number of frames in the composed timeline (0 for other charts).
    pub fn timeline_len(&self) -> usize {
        match &self.chart {
            Some(ChartSpec::Timeline(spec)) => spec.frames.len(),
            _ => 0,
        }
    }

    /// Advance the timeline one frame, wrapping at the end.
    pub fn step_timeline(&mut self) {
        let len = self.timeline_len();
        if len > 0 {
            self.timeline_frame = (self.timeline_frame + 1) % len;
        }
    }

    /// Start or stop timeline playback. Resuming counts the next automatic
    /// step from `now`, not from the last step before the pause.
    pub fn set_timeline_playing(&mut self, playing: bool, now: f64) {
        if playing && !self.timeline_playing {
            self.timeline_last_step = now;
        }
        self.timeline_playing = playing;
    }

    /// Write the composed chart spec as JSON, for external renderers. The
    /// spec is serialized before the file is created, so a failed export
    /// never leaves a partial file behind.
    pub fn export_chart(&self, path: &Path) -> anyhow::Result<()> {
        let chart = self.chart.as_ref().context("no chart to export")?;
        let json = serde_json::to_string_pretty(chart).context("serializing chart spec")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
