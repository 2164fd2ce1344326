use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::model::{Field, OwnerDataset, OwnerRecord};

// ---------------------------------------------------------------------------
// FilterCriteria: the active per-dimension constraints
// ---------------------------------------------------------------------------

/// An inclusive `[min, max]` constraint on a numeric dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        RangeFilter { min, max }
    }

    /// Neutral range that accepts every value.
    pub fn unbounded() -> Self {
        RangeFilter {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Both ends inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }
}

/// Malformed criteria. The engine itself stays total (an inverted range
/// simply matches nothing), but stateful callers validate first so they
/// can keep the previous valid criteria instead.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("invalid {} range: min {min} exceeds max {max}", .field.label())]
    InvertedRange { field: Field, min: f64, max: f64 },
}

/// The currently active constraints, one optional entry per filterable
/// dimension.
///
/// * `selected`: per categorical dimension, the accepted-value set. A
///   missing entry or an **empty set means "no constraint"**, never
///   "reject all": a user who has ticked nothing sees everything.
/// * `modified`: the Yes/No dimension; `None` means no constraint.
/// * `age` / `income`: inclusive ranges, always present (seeded from the
///   active profile's defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub selected: BTreeMap<Field, BTreeSet<String>>,
    pub modified: Option<bool>,
    pub age: RangeFilter,
    pub income: RangeFilter,
}

impl FilterCriteria {
    pub fn new(age: RangeFilter, income: RangeFilter) -> Self {
        FilterCriteria {
            selected: BTreeMap::new(),
            modified: None,
            age,
            income,
        }
    }

    /// Criteria that keep every row; handy as a starting point.
    pub fn unconstrained() -> Self {
        FilterCriteria::new(RangeFilter::unbounded(), RangeFilter::unbounded())
    }

    /// The accepted-value set of a categorical dimension, if any was ticked.
    pub fn selection(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.selected.get(&field)
    }

    /// Whether a categorical dimension currently imposes a constraint.
    pub fn constrains(&self, field: Field) -> bool {
        self.selected.get(&field).is_some_and(|s| !s.is_empty())
    }

    /// Flip a single value in a dimension's accepted set.
    pub fn toggle_value(&mut self, field: Field, value: &str) {
        let selected = self.selected.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Accept every listed value for the dimension.
    pub fn select_all<I>(&mut self, field: Field, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.selected.insert(field, values.into_iter().collect());
    }

    /// Drop the dimension's constraint (show all values again).
    pub fn clear_selection(&mut self, field: Field) {
        self.selected.insert(field, BTreeSet::new());
    }

    /// Reject criteria whose ranges are inverted (`min > max`).
    pub fn validate(&self) -> Result<(), FilterError> {
        for (field, range) in [(Field::Age, self.age), (Field::Income, self.income)] {
            if range.is_inverted() {
                return Err(FilterError::InvertedRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the rows passing all active constraints
// ---------------------------------------------------------------------------

/// Positions of the passing rows, in dataset order. A fresh value per
/// recomputation; never cached across datasets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredView {
    pub indices: Vec<usize>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate the passing records of `dataset`.
    pub fn records<'a>(
        &'a self,
        dataset: &'a OwnerDataset,
    ) -> impl Iterator<Item = &'a OwnerRecord> + 'a {
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

// ---------------------------------------------------------------------------
// The filter engine
// ---------------------------------------------------------------------------

/// Apply all active constraints to the dataset.
///
/// The result is the intersection (logical AND) of the per-dimension
/// keep-sets; predicates are pure, so application order cannot change the
/// outcome. Over-constrained criteria yield an empty view, not an error.
/// The dataset is never mutated.
pub fn apply(dataset: &OwnerDataset, criteria: &FilterCriteria) -> FilteredView {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| row_passes(record, criteria))
        .map(|(i, _)| i)
        .collect();
    FilteredView { indices }
}

fn row_passes(record: &OwnerRecord, criteria: &FilterCriteria) -> bool {
    for (field, selected) in &criteria.selected {
        if selected.is_empty() {
            continue;
        }
        if !selected.contains(&record.value(*field).to_string()) {
            return false;
        }
    }

    if !criteria.age.contains(record.age as f64) {
        return false;
    }
    if !criteria.income.contains(record.income) {
        return false;
    }

    if let Some(modified) = criteria.modified {
        if record.modified != modified {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: &str, gender: &str, age: u32, income: f64) -> OwnerRecord {
        OwnerRecord {
            owner_id: id.to_string(),
            gender: gender.to_string(),
            age,
            income,
            ..OwnerRecord::default()
        }
    }

    fn five_owners() -> OwnerDataset {
        OwnerDataset::from_records(vec![
            owner("O001", "Female", 18, 20000.0),
            owner("O002", "Male", 20, 45000.0),
            owner("O003", "Female", 35, 60000.0),
            owner("O004", "Other", 50, 80000.0),
            owner("O005", "Female", 70, 150000.0),
        ])
    }

    fn ids(dataset: &OwnerDataset, view: &FilteredView) -> Vec<String> {
        view.records(dataset).map(|r| r.owner_id.clone()).collect()
    }

    #[test]
    fn unconstrained_criteria_keep_everything() {
        let ds = five_owners();
        let view = apply(&ds, &FilterCriteria::unconstrained());
        assert_eq!(view.len(), ds.len());
        assert_eq!(view.indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn categorical_selection_keeps_members_only() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.toggle_value(Field::Gender, "Female");

        let view = apply(&ds, &criteria);
        assert_eq!(ids(&ds, &view), vec!["O001", "O003", "O005"]);
    }

    #[test]
    fn empty_selection_means_no_constraint() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        // Tick a value, then untick it again: the empty set must behave
        // like no filter at all, not like "reject all".
        criteria.toggle_value(Field::Gender, "Female");
        criteria.toggle_value(Field::Gender, "Female");

        let view = apply(&ds, &criteria);
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn selecting_every_observed_value_equals_unset() {
        let ds = five_owners();
        let all_genders = ds
            .distinct_values(Field::Gender)
            .unwrap()
            .iter()
            .map(|v| v.to_string());

        let mut criteria = FilterCriteria::unconstrained();
        criteria.select_all(Field::Gender, all_genders);

        assert_eq!(
            apply(&ds, &criteria),
            apply(&ds, &FilterCriteria::unconstrained())
        );
    }

    #[test]
    fn range_bounds_are_inclusive_both_ends() {
        // Ages 18, 20, 35, 50, 70 with [20, 50]: exactly 20, 35 and 50 pass.
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.age = RangeFilter::new(20.0, 50.0);

        let view = apply(&ds, &criteria);
        assert_eq!(ids(&ds, &view), vec!["O002", "O003", "O004"]);
    }

    #[test]
    fn modified_filter_matches_exactly_or_not_at_all() {
        let mut records = vec![
            owner("O001", "Female", 30, 50000.0),
            owner("O002", "Male", 40, 60000.0),
        ];
        records[1].modified = true;
        let ds = OwnerDataset::from_records(records);

        let mut criteria = FilterCriteria::unconstrained();
        criteria.modified = Some(true);
        assert_eq!(ids(&ds, &apply(&ds, &criteria)), vec!["O002"]);

        criteria.modified = None;
        assert_eq!(apply(&ds, &criteria).len(), 2);
    }

    #[test]
    fn dimensions_compose_as_intersection() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.toggle_value(Field::Gender, "Female");
        criteria.age = RangeFilter::new(30.0, 80.0);

        // Female AND age in [30, 80]: O003 (35) and O005 (70).
        let view = apply(&ds, &criteria);
        assert_eq!(ids(&ds, &view), vec!["O003", "O005"]);
    }

    #[test]
    fn over_constrained_criteria_yield_empty_view_not_error() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.toggle_value(Field::Gender, "Nonbinary");

        let view = apply(&ds, &criteria);
        assert!(view.is_empty());
        assert_eq!(view.len(), 0);
    }

    #[test]
    fn result_is_an_order_preserving_subsequence() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.income = RangeFilter::new(40000.0, 200000.0);

        let view = apply(&ds, &criteria);
        for pair in view.indices.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        for record in view.records(&ds) {
            assert!(record.income >= 40000.0);
        }
    }

    #[test]
    fn constraint_application_commutes() {
        let ds = five_owners();

        // Combined criteria.
        let mut combined = FilterCriteria::unconstrained();
        combined.toggle_value(Field::Gender, "Female");
        combined.age = RangeFilter::new(20.0, 70.0);
        combined.income = RangeFilter::new(30000.0, 160000.0);

        // Single-dimension keep-sets, intersected in an arbitrary order.
        let mut only_gender = FilterCriteria::unconstrained();
        only_gender.toggle_value(Field::Gender, "Female");
        let mut only_age = FilterCriteria::unconstrained();
        only_age.age = RangeFilter::new(20.0, 70.0);
        let mut only_income = FilterCriteria::unconstrained();
        only_income.income = RangeFilter::new(30000.0, 160000.0);

        let intersect = |a: &FilteredView, b: &FilteredView| FilteredView {
            indices: a
                .indices
                .iter()
                .filter(|i| b.indices.contains(i))
                .copied()
                .collect(),
        };

        let g = apply(&ds, &only_gender);
        let a = apply(&ds, &only_age);
        let i = apply(&ds, &only_income);

        let forward = intersect(&intersect(&g, &a), &i);
        let backward = intersect(&intersect(&i, &a), &g);
        let combined_view = apply(&ds, &combined);

        assert_eq!(forward, combined_view);
        assert_eq!(backward, combined_view);
    }

    #[test]
    fn gender_scenario_from_five_rows() {
        let ds = five_owners();
        let mut criteria = FilterCriteria::unconstrained();
        criteria.select_all(Field::Gender, ["Female".to_string()]);

        let view = apply(&ds, &criteria);
        assert_eq!(view.len(), 3);
        assert!(view.records(&ds).all(|r| r.gender == "Female"));
    }

    #[test]
    fn inverted_range_is_rejected_by_validate_but_never_panics() {
        let mut criteria = FilterCriteria::unconstrained();
        criteria.age = RangeFilter::new(50.0, 20.0);

        assert_eq!(
            criteria.validate(),
            Err(FilterError::InvertedRange {
                field: Field::Age,
                min: 50.0,
                max: 20.0,
            })
        );

        // The engine itself stays total: an inverted range matches nothing.
        let ds = five_owners();
        assert!(apply(&ds, &criteria).is_empty());
    }
}
