use std::collections::HashMap;

use super::spec::{
    ChartSpec, SankeyLink, SankeySpec, ScatterPoint, ScatterSpec, TimelineFrame, TimelineSpec,
    VizMode,
};
use crate::data::filter::FilteredView;
use crate::data::model::{Field, OwnerDataset, OwnerRecord};
use crate::profile::{DashboardProfile, ScatterMapping};

/// Timeline encodings are the same for both profiles.
const TIMELINE_MAPPING: ScatterMapping = ScatterMapping {
    x: Field::CarAge,
    y: Field::NumberOfOwners,
    color: Some(Field::Make),
    size: Some(Field::Cost),
    symbol: None,
    hover: &[Field::Model, Field::FuelType],
};

/// Bare age-vs-cost scatter shown when no recognized mode is selected.
const FALLBACK_MAPPING: ScatterMapping = ScatterMapping {
    x: Field::Age,
    y: Field::Cost,
    color: None,
    size: None,
    symbol: None,
    hover: &[],
};

/// Compose the chart for the current view.
///
/// Pure: reads the dataset through the view's indices and materializes
/// every encoding into the returned spec. An empty view yields an empty
/// spec of the requested type.
pub fn render(
    dataset: &OwnerDataset,
    view: &FilteredView,
    mode: Option<VizMode>,
    profile: &DashboardProfile,
) -> ChartSpec {
    match mode {
        Some(VizMode::Scatter) => scatter(dataset, view, &profile.scatter, profile.scatter_title),
        Some(VizMode::Sankey) => sankey(dataset, view),
        Some(VizMode::Timeline) => timeline(dataset, view),
        None => scatter(dataset, view, &FALLBACK_MAPPING, ""),
    }
}

fn scatter(
    dataset: &OwnerDataset,
    view: &FilteredView,
    mapping: &ScatterMapping,
    title: &str,
) -> ChartSpec {
    let points = view
        .records(dataset)
        .map(|record| point(record, mapping))
        .collect();

    ChartSpec::Scatter(ScatterSpec {
        title: title.to_string(),
        x_field: mapping.x,
        y_field: mapping.y,
        color_field: mapping.color,
        size_field: mapping.size,
        symbol_field: mapping.symbol,
        points,
    })
}

fn point(record: &OwnerRecord, mapping: &ScatterMapping) -> ScatterPoint {
    ScatterPoint {
        x: axis_value(record, mapping.x),
        y: axis_value(record, mapping.y),
        size: mapping.size.map(|f| axis_value(record, f)),
        color_key: mapping.color.map(|f| record.value(f).to_string()),
        symbol_key: mapping.symbol.map(|f| record.value(f).to_string()),
        hover: mapping
            .hover
            .iter()
            .map(|&f| (f, record.value(f).to_string()))
            .collect(),
    }
}

// Mappings only put numeric fields on axes; a non-numeric field would be a
// mapping bug and plots at zero rather than panicking.
fn axis_value(record: &OwnerRecord, field: Field) -> f64 {
    record.numeric(field).unwrap_or(0.0)
}

/// Gender → body-style flow. The label list is the distinct genders in
/// first-seen row order followed by the distinct body styles likewise, so
/// sources come before targets; link indices are only valid against this
/// one list.
fn sankey(dataset: &OwnerDataset, view: &FilteredView) -> ChartSpec {
    let mut labels: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in view.records(dataset) {
        intern(&mut labels, &mut index, &record.gender);
    }
    for record in view.records(dataset) {
        intern(&mut labels, &mut index, &record.body_style);
    }

    let links = view
        .records(dataset)
        .map(|record| SankeyLink {
            // Interned above, so indexing cannot miss.
            source: index[&record.gender],
            target: index[&record.body_style],
            value: 1.0,
        })
        .collect();

    ChartSpec::Sankey(SankeySpec {
        title: "Gender to Body Style Ownership Flow".to_string(),
        labels,
        links,
    })
}

fn intern(labels: &mut Vec<String>, index: &mut HashMap<String, usize>, value: &str) -> usize {
    if let Some(&i) = index.get(value) {
        return i;
    }
    let i = labels.len();
    labels.push(value.to_string());
    index.insert(value.to_string(), i);
    i
}

/// One frame per distinct car age in the view, ascending; rows keep their
/// view order within a frame.
fn timeline(dataset: &OwnerDataset, view: &FilteredView) -> ChartSpec {
    let mut by_age: std::collections::BTreeMap<u32, Vec<ScatterPoint>> =
        std::collections::BTreeMap::new();
    for record in view.records(dataset) {
        by_age
            .entry(record.car_age)
            .or_default()
            .push(point(record, &TIMELINE_MAPPING));
    }

    let frames = by_age
        .into_iter()
        .map(|(car_age, points)| TimelineFrame { car_age, points })
        .collect();

    ChartSpec::Timeline(TimelineSpec {
        title: "Ownership History by Car Age".to_string(),
        color_field: TIMELINE_MAPPING.color,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::OwnerRecord;
    use crate::profile::{OWNERSHIP_EXPLORER, RELATIONSHIP_VISUALIZER};

    fn owner(gender: &str, body: &str, car_age: u32, owners: u32) -> OwnerRecord {
        OwnerRecord {
            gender: gender.to_string(),
            body_style: body.to_string(),
            car_age,
            number_of_owners: owners,
            ..OwnerRecord::default()
        }
    }

    fn full_view(dataset: &OwnerDataset) -> FilteredView {
        apply(dataset, &FilterCriteria::unconstrained())
    }

    #[test]
    fn sankey_labels_follow_first_seen_row_order() {
        let ds = OwnerDataset::from_records(vec![
            owner("Female", "SUV", 1, 1),
            owner("Male", "SUV", 2, 1),
            owner("Female", "Sedan", 3, 1),
            owner("Other", "Coupe", 4, 1),
        ]);
        let view = full_view(&ds);

        let ChartSpec::Sankey(spec) = render(&ds, &view, Some(VizMode::Sankey), &OWNERSHIP_EXPLORER)
        else {
            panic!("expected a sankey spec");
        };

        assert_eq!(
            spec.labels,
            ["Female", "Male", "Other", "SUV", "Sedan", "Coupe"]
        );
        assert_eq!(spec.links.len(), view.len());
        assert_eq!(
            spec.links[0],
            SankeyLink {
                source: 0,
                target: 3,
                value: 1.0
            }
        );
        // Every link addresses the label list.
        for link in &spec.links {
            assert!(link.source < spec.labels.len());
            assert!(link.target < spec.labels.len());
        }
    }

    #[test]
    fn sankey_carries_one_unit_link_per_filtered_row() {
        let ds = OwnerDataset::from_records(vec![
            owner("Female", "SUV", 1, 1),
            owner("Male", "Sedan", 2, 1),
            owner("Female", "SUV", 3, 1),
        ]);
        let mut criteria = FilterCriteria::unconstrained();
        criteria.toggle_value(Field::Gender, "Female");
        let view = apply(&ds, &criteria);
        assert_eq!(view.len(), 2);

        let ChartSpec::Sankey(spec) = render(&ds, &view, Some(VizMode::Sankey), &OWNERSHIP_EXPLORER)
        else {
            panic!("expected a sankey spec");
        };
        assert_eq!(spec.links.len(), 2);
        assert!(spec.links.iter().all(|l| l.value == 1.0));
        assert_eq!(spec.labels, ["Female", "SUV"]);
    }

    #[test]
    fn timeline_frames_ascend_by_car_age() {
        let ds = OwnerDataset::from_records(vec![
            owner("Female", "SUV", 7, 2),
            owner("Male", "Sedan", 3, 1),
            owner("Other", "Coupe", 3, 2),
            owner("Male", "SUV", 12, 4),
        ]);
        let view = full_view(&ds);

        let ChartSpec::Timeline(spec) =
            render(&ds, &view, Some(VizMode::Timeline), &OWNERSHIP_EXPLORER)
        else {
            panic!("expected a timeline spec");
        };

        let ages: Vec<u32> = spec.frames.iter().map(|f| f.car_age).collect();
        assert_eq!(ages, [3, 7, 12]);
        // The two car-age-3 rows share a frame, in view order.
        assert_eq!(spec.frames[0].points.len(), 2);
        assert_eq!(spec.frames[0].points[0].y, 1.0);
        assert_eq!(spec.frames[0].points[1].y, 2.0);
    }

    #[test]
    fn scatter_points_carry_the_profile_encodings() {
        let record = OwnerRecord {
            age: 40,
            engine_size: 2.0,
            cost: 21000.0,
            gender: "Female".to_string(),
            make: "Skoda".to_string(),
            model: "Octavia".to_string(),
            body_style: "Wagon".to_string(),
            income: 52000.0,
            ..OwnerRecord::default()
        };
        let ds = OwnerDataset::from_records(vec![record]);
        let view = full_view(&ds);

        let ChartSpec::Scatter(spec) =
            render(&ds, &view, Some(VizMode::Scatter), &OWNERSHIP_EXPLORER)
        else {
            panic!("expected a scatter spec");
        };

        assert_eq!(spec.title, "Owner Age vs Engine Size by Gender");
        let p = &spec.points[0];
        assert_eq!((p.x, p.y), (40.0, 2.0));
        assert_eq!(p.size, Some(21000.0));
        assert_eq!(p.color_key.as_deref(), Some("Female"));
        assert_eq!(p.symbol_key, None);
        let hover: Vec<&str> = p.hover.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(hover, ["Skoda", "Octavia", "Wagon", "52000"]);
    }

    #[test]
    fn visualizer_scatter_carries_its_own_encodings() {
        let record = OwnerRecord {
            owner_id: "O007".to_string(),
            occupation: "Engineer".to_string(),
            fuel_type: "Diesel".to_string(),
            driving_style: "Calm".to_string(),
            mileage_per_year: 12000,
            service_visits: 3,
            gender: "Male".to_string(),
            body_style: "Coupe".to_string(),
            car_age: 6,
            engine_size: 3.0,
            cost: 31000.0,
            ..OwnerRecord::default()
        };
        let ds = OwnerDataset::from_records(vec![record]);
        let view = full_view(&ds);

        let ChartSpec::Scatter(spec) =
            render(&ds, &view, Some(VizMode::Scatter), &RELATIONSHIP_VISUALIZER)
        else {
            panic!("expected a scatter spec");
        };

        assert_eq!(
            spec.title,
            "Relationship Between Car Cost & Age by Owner Attributes"
        );
        assert_eq!(spec.x_field, Field::CarAge);
        assert_eq!(spec.y_field, Field::Cost);
        let p = &spec.points[0];
        assert_eq!((p.x, p.y), (6.0, 31000.0));
        assert_eq!(p.size, Some(3.0));
        assert_eq!(p.color_key.as_deref(), Some("Male"));
        assert_eq!(p.symbol_key.as_deref(), Some("Coupe"));
        let fields: Vec<Field> = p.hover.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            [
                Field::OwnerId,
                Field::Occupation,
                Field::FuelType,
                Field::DrivingStyle,
                Field::MileagePerYear,
                Field::ServiceVisits,
            ]
        );
        let hover: Vec<&str> = p.hover.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(hover, ["O007", "Engineer", "Diesel", "Calm", "12000", "3"]);
    }

    #[test]
    fn no_mode_falls_back_to_the_bare_scatter() {
        let ds = OwnerDataset::from_records(vec![owner("Female", "SUV", 1, 1)]);
        let view = full_view(&ds);

        let ChartSpec::Scatter(spec) = render(&ds, &view, None, &OWNERSHIP_EXPLORER) else {
            panic!("expected a scatter spec");
        };
        assert_eq!(spec.title, "");
        assert_eq!(spec.x_field, Field::Age);
        assert_eq!(spec.y_field, Field::Cost);
        assert_eq!(spec.color_field, None);
        assert!(spec.points[0].hover.is_empty());
    }

    #[test]
    fn empty_views_compose_empty_charts() {
        let ds = OwnerDataset::from_records(vec![owner("Female", "SUV", 1, 1)]);
        let view = FilteredView::default();

        for mode in [None, Some(VizMode::Scatter), Some(VizMode::Sankey), Some(VizMode::Timeline)]
        {
            let spec = render(&ds, &view, mode, &OWNERSHIP_EXPLORER);
            assert!(spec.is_empty());
        }
    }
}
