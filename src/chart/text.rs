use std::collections::BTreeSet;

use crate::data::filter::{FilterCriteria, RangeFilter};
use crate::data::model::Field;

/// Headline shown when no criteria are set.
pub const HEADLINE_PLACEHOLDER: &str = "Exploring Car-Owner Relationships";

/// The record-count line under the chart. The denominator is always the
/// operating dataset's full size, never a previously filtered count.
pub fn summary(filtered: usize, total: usize) -> String {
    format!("Showing {filtered} records filtered from total {total} owners.")
}

/// The criteria-derived headline: one clause per set dimension, joined
/// with ", " in fixed order (gender, ages, income, make, fuel, body
/// style) and prefixed "Filtered View: ". With nothing set the
/// placeholder is returned.
///
/// A range counts as set only while it is narrower than its slider span;
/// ranges always carry values, so comparing against the span is what
/// makes the placeholder reachable. Selected values are listed in sorted
/// order.
pub fn headline(
    criteria: &FilterCriteria,
    age_span: (f64, f64),
    income_span: (f64, f64),
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(values) = selected(criteria, Field::Gender) {
        parts.push(join(values, " & "));
    }
    if narrower(criteria.age, age_span) {
        parts.push(format!(
            "ages {}–{}",
            whole(criteria.age.min),
            whole(criteria.age.max)
        ));
    }
    if narrower(criteria.income, income_span) {
        parts.push(format!(
            "income ${}–${}",
            whole(criteria.income.min),
            whole(criteria.income.max)
        ));
    }
    if let Some(values) = selected(criteria, Field::Make) {
        parts.push(format!("driving {}", join(values, " & ")));
    }
    if let Some(values) = selected(criteria, Field::FuelType) {
        parts.push(format!("using {}", join(values, " & ")));
    }
    if let Some(values) = selected(criteria, Field::BodyStyle) {
        parts.push(format!("({})", join(values, ", ")));
    }

    if parts.is_empty() {
        HEADLINE_PLACEHOLDER.to_string()
    } else {
        format!("Filtered View: {}", parts.join(", "))
    }
}

fn selected(criteria: &FilterCriteria, field: Field) -> Option<&BTreeSet<String>> {
    criteria.selection(field).filter(|s| !s.is_empty())
}

fn join(values: &BTreeSet<String>, separator: &str) -> String {
    values
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

fn narrower(range: RangeFilter, span: (f64, f64)) -> bool {
    range.min > span.0 || range.max < span.1
}

// Slider values are whole numbers; print them without a fraction.
fn whole(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGE_SPAN: (f64, f64) = (18.0, 80.0);
    const INCOME_SPAN: (f64, f64) = (10000.0, 200000.0);

    fn spanning_criteria() -> FilterCriteria {
        FilterCriteria::new(
            RangeFilter::new(AGE_SPAN.0, AGE_SPAN.1),
            RangeFilter::new(INCOME_SPAN.0, INCOME_SPAN.1),
        )
    }

    #[test]
    fn summary_wording_is_exact() {
        assert_eq!(
            summary(3, 5),
            "Showing 3 records filtered from total 5 owners."
        );
        assert_eq!(
            summary(0, 100),
            "Showing 0 records filtered from total 100 owners."
        );
    }

    #[test]
    fn placeholder_when_nothing_is_set() {
        let criteria = spanning_criteria();
        assert_eq!(
            headline(&criteria, AGE_SPAN, INCOME_SPAN),
            "Exploring Car-Owner Relationships"
        );
    }

    #[test]
    fn empty_selections_do_not_count_as_set() {
        let mut criteria = spanning_criteria();
        criteria.toggle_value(Field::Gender, "Female");
        criteria.toggle_value(Field::Gender, "Female");
        assert_eq!(
            headline(&criteria, AGE_SPAN, INCOME_SPAN),
            "Exploring Car-Owner Relationships"
        );
    }

    #[test]
    fn clauses_follow_the_fixed_order() {
        let mut criteria = FilterCriteria::new(
            RangeFilter::new(20.0, 50.0),
            RangeFilter::new(30000.0, 100000.0),
        );
        criteria.toggle_value(Field::Gender, "Male");
        criteria.toggle_value(Field::Gender, "Other");
        criteria.toggle_value(Field::Make, "BMW");
        criteria.toggle_value(Field::Make, "Audi");
        criteria.toggle_value(Field::FuelType, "Petrol");
        criteria.toggle_value(Field::BodyStyle, "SUV");
        criteria.toggle_value(Field::BodyStyle, "Coupe");

        assert_eq!(
            headline(&criteria, AGE_SPAN, INCOME_SPAN),
            "Filtered View: Male & Other, ages 20–50, income $30000–$100000, \
             driving Audi & BMW, using Petrol, (Coupe, SUV)"
        );
    }

    #[test]
    fn a_range_is_set_once_either_end_narrows() {
        let mut criteria = spanning_criteria();
        criteria.age = RangeFilter::new(25.0, AGE_SPAN.1);
        assert_eq!(
            headline(&criteria, AGE_SPAN, INCOME_SPAN),
            "Filtered View: ages 25–80"
        );

        criteria.age = RangeFilter::new(AGE_SPAN.0, AGE_SPAN.1);
        criteria.income = RangeFilter::new(INCOME_SPAN.0, 99000.0);
        assert_eq!(
            headline(&criteria, AGE_SPAN, INCOME_SPAN),
            "Filtered View: income $10000–$99000"
        );
    }
}
