//! The two dashboard variants, expressed as configuration.
//!
//! Both dashboards run the same load → filter → render pipeline; what
//! differs between them is which filters are offered, how the scatter is
//! mapped, which chart modes exist, and whether the variant works on the
//! full file or a deterministic sample. All of that is data, collected
//! here as const presets so the rest of the crate stays variant-agnostic.

use crate::chart::VizMode;
use crate::data::filter::{FilterCriteria, RangeFilter};
use crate::data::model::{Field, OwnerDataset};

/// Field encodings for the scatter chart.
#[derive(Debug, Clone, Copy)]
pub struct ScatterMapping {
    pub x: Field,
    pub y: Field,
    pub color: Option<Field>,
    pub size: Option<Field>,
    pub symbol: Option<Field>,
    /// Extra fields shown in the hover tooltip, in this order.
    pub hover: &'static [Field],
}

/// Deterministic sub-sampling applied to the loaded file before anything
/// else sees it.
#[derive(Debug, Clone, Copy)]
pub struct SampleSpec {
    pub rows: usize,
    pub seed: u64,
}

/// Everything that distinguishes one dashboard variant from the other.
#[derive(Debug, Clone, Copy)]
pub struct DashboardProfile {
    /// Short name for the profile selector.
    pub name: &'static str,
    /// Heading shown above the chart.
    pub heading: &'static str,
    /// Categorical dimensions offered as checkbox filters, in panel order.
    pub category_filters: &'static [Field],
    /// Whether the Yes/No modified radio is offered.
    pub modified_filter: bool,
    /// Fixed age slider span; `None` uses the dataset bounds.
    pub age_span: Option<(f64, f64)>,
    pub age_default: (f64, f64),
    /// Fixed income slider span; `None` uses the dataset bounds.
    pub income_span: Option<(f64, f64)>,
    pub income_default: (f64, f64),
    pub scatter: ScatterMapping,
    pub scatter_title: &'static str,
    /// Chart modes offered, first entry is the default.
    pub modes: &'static [VizMode],
    /// Whether the heading is followed by the criteria-derived headline.
    pub dynamic_headline: bool,
    pub sample: Option<SampleSpec>,
}

/// Variant 1: every demographic and vehicle filter, scatter only,
/// cost-vs-age mapping, full dataset.
pub const RELATIONSHIP_VISUALIZER: DashboardProfile = DashboardProfile {
    name: "Relationship Visualizer",
    heading: "Car and Owner Relationship Visualizer",
    category_filters: &[
        Field::Gender,
        Field::Ethnicity,
        Field::Occupation,
        Field::Make,
        Field::FuelType,
        Field::DrivingStyle,
    ],
    modified_filter: true,
    age_span: None,
    age_default: (20.0, 50.0),
    income_span: None,
    income_default: (30000.0, 120000.0),
    scatter: ScatterMapping {
        x: Field::CarAge,
        y: Field::Cost,
        color: Some(Field::Gender),
        size: Some(Field::EngineSize),
        symbol: Some(Field::BodyStyle),
        hover: &[
            Field::OwnerId,
            Field::Occupation,
            Field::FuelType,
            Field::DrivingStyle,
            Field::MileagePerYear,
            Field::ServiceVisits,
        ],
    },
    scatter_title: "Relationship Between Car Cost & Age by Owner Attributes",
    modes: &[VizMode::Scatter],
    dynamic_headline: false,
    sample: None,
};

/// Variant 2: fewer filters, three chart modes, age-vs-engine mapping,
/// dynamic headline, and a 100-row deterministic sample of the file.
pub const OWNERSHIP_EXPLORER: DashboardProfile = DashboardProfile {
    name: "Ownership Explorer",
    heading: "Car-Owner Relationship Explorer",
    category_filters: &[
        Field::Make,
        Field::Gender,
        Field::FuelType,
        Field::BodyStyle,
    ],
    modified_filter: false,
    age_span: Some((18.0, 80.0)),
    age_default: (20.0, 50.0),
    income_span: Some((10000.0, 200000.0)),
    income_default: (30000.0, 100000.0),
    scatter: ScatterMapping {
        x: Field::Age,
        y: Field::EngineSize,
        color: Some(Field::Gender),
        size: Some(Field::Cost),
        symbol: None,
        hover: &[Field::Make, Field::Model, Field::BodyStyle, Field::Income],
    },
    scatter_title: "Owner Age vs Engine Size by Gender",
    modes: &[VizMode::Scatter, VizMode::Sankey, VizMode::Timeline],
    dynamic_headline: true,
    sample: Some(SampleSpec {
        rows: 100,
        seed: 42,
    }),
};

/// All selectable profiles, default first.
pub const PROFILES: [&DashboardProfile; 2] = [&OWNERSHIP_EXPLORER, &RELATIONSHIP_VISUALIZER];

impl DashboardProfile {
    /// Age slider span: the fixed one, else the dataset bounds, else the
    /// profile default (empty dataset).
    pub fn age_span(&self, dataset: &OwnerDataset) -> (f64, f64) {
        self.age_span
            .or_else(|| dataset.bounds(Field::Age))
            .unwrap_or(self.age_default)
    }

    /// Income slider span, same resolution order as [`Self::age_span`].
    pub fn income_span(&self, dataset: &OwnerDataset) -> (f64, f64) {
        self.income_span
            .or_else(|| dataset.bounds(Field::Income))
            .unwrap_or(self.income_default)
    }

    /// Fresh criteria for this profile: no categorical selections, ranges
    /// at the profile defaults clamped into the slider spans.
    pub fn initial_criteria(&self, dataset: &OwnerDataset) -> FilterCriteria {
        let (age_lo, age_hi) = self.age_span(dataset);
        let (inc_lo, inc_hi) = self.income_span(dataset);
        FilterCriteria::new(
            RangeFilter::new(
                self.age_default.0.clamp(age_lo, age_hi),
                self.age_default.1.clamp(age_lo, age_hi),
            ),
            RangeFilter::new(
                self.income_default.0.clamp(inc_lo, inc_hi),
                self.income_default.1.clamp(inc_lo, inc_hi),
            ),
        )
    }

    /// The dataset this profile operates on: the loaded file, sub-sampled
    /// when the profile specifies a sample.
    pub fn operating_dataset(&self, full: &OwnerDataset) -> OwnerDataset {
        match self.sample {
            Some(SampleSpec { rows, seed }) => full.sample(rows, seed),
            None => full.clone(),
        }
    }

    pub fn default_mode(&self) -> VizMode {
        self.modes.first().copied().unwrap_or(VizMode::Scatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::OwnerRecord;

    fn dataset(ages: &[u32]) -> OwnerDataset {
        let records = ages
            .iter()
            .enumerate()
            .map(|(i, &age)| OwnerRecord {
                owner_id: format!("O{:03}", i + 1),
                age,
                income: 40000.0 + i as f64 * 1000.0,
                ..OwnerRecord::default()
            })
            .collect();
        OwnerDataset::from_records(records)
    }

    #[test]
    fn initial_criteria_clamp_defaults_into_the_span() {
        // Dataset ages 25..=45, visualizer default range is 20..=50.
        let ds = dataset(&[25, 30, 45]);
        let criteria = RELATIONSHIP_VISUALIZER.initial_criteria(&ds);
        assert_eq!((criteria.age.min, criteria.age.max), (25.0, 45.0));

        // Explorer span is fixed, so the default survives untouched.
        let criteria = OWNERSHIP_EXPLORER.initial_criteria(&ds);
        assert_eq!((criteria.age.min, criteria.age.max), (20.0, 50.0));
        assert_eq!(
            (criteria.income.min, criteria.income.max),
            (30000.0, 100000.0)
        );
    }

    #[test]
    fn explorer_samples_and_visualizer_does_not() {
        let ages: Vec<u32> = (0..150).map(|i| 18 + (i % 50)).collect();
        let ds = dataset(&ages);

        let operating = OWNERSHIP_EXPLORER.operating_dataset(&ds);
        assert_eq!(operating.len(), 100);
        let again = OWNERSHIP_EXPLORER.operating_dataset(&ds);
        assert_eq!(operating.records, again.records);

        assert_eq!(RELATIONSHIP_VISUALIZER.operating_dataset(&ds).len(), 150);
    }

    #[test]
    fn profile_spans_follow_the_dataset_when_not_fixed() {
        let ds = dataset(&[22, 61]);
        assert_eq!(RELATIONSHIP_VISUALIZER.age_span(&ds), (22.0, 61.0));
        assert_eq!(OWNERSHIP_EXPLORER.age_span(&ds), (18.0, 80.0));
    }
}
