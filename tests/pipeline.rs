use std::io::Write;

use anyhow::Result;

use carscope::chart::{render, summary, ChartSpec, VizMode};
use carscope::data::filter::{apply, FilterCriteria};
use carscope::data::loader::load_file;
use carscope::data::model::{Field, OwnerDataset, OwnerRecord};
use carscope::data::synth::{synth_owners, write_csv, write_file};
use carscope::profile::{OWNERSHIP_EXPLORER, RELATIONSHIP_VISUALIZER};
use carscope::state::AppState;

fn owner(id: usize, gender: &str, age: u32) -> OwnerRecord {
    OwnerRecord {
        owner_id: format!("O{id:03}"),
        gender: gender.to_string(),
        age,
        income: 50000.0,
        ..OwnerRecord::default()
    }
}

#[test]
fn generated_file_loads_filters_and_renders() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("owners.csv");
    let owners = synth_owners(60, 42);
    write_csv(&path, &owners)?;

    let dataset = load_file(&path)?;
    assert_eq!(dataset.len(), 60);

    // 60 rows is under the explorer's sample size, so it works on all of
    // them.
    let profile = &OWNERSHIP_EXPLORER;
    let operating = profile.operating_dataset(&dataset);
    assert_eq!(operating.len(), 60);

    let criteria = profile.initial_criteria(&operating);
    let view = apply(&operating, &criteria);

    for mode in [VizMode::Scatter, VizMode::Sankey, VizMode::Timeline] {
        let chart = render(&operating, &view, Some(mode), profile);
        if let ChartSpec::Sankey(sankey) = &chart {
            assert_eq!(sankey.links.len(), view.len());
            for link in &sankey.links {
                assert!(link.source < sankey.labels.len());
                assert!(link.target < sankey.labels.len());
            }
        }
    }

    assert_eq!(
        summary(view.len(), operating.len()),
        format!(
            "Showing {} records filtered from total 60 owners.",
            view.len()
        )
    );
    Ok(())
}

#[test]
fn explorer_sampling_is_deterministic_and_order_preserving() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("owners.parquet");
    write_file(&path, &synth_owners(150, 7))?;

    let dataset = load_file(&path)?;
    let first = OWNERSHIP_EXPLORER.operating_dataset(&dataset);
    let second = OWNERSHIP_EXPLORER.operating_dataset(&dataset);

    assert_eq!(first.len(), 100);
    assert_eq!(first.records, second.records);

    // The generator writes sequential ids, so an order-preserving sample
    // keeps them ascending.
    let ids: Vec<&str> = first.records.iter().map(|r| r.owner_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);

    // Domains come from the sample, not the file.
    let fuels = first
        .distinct_values(Field::FuelType)
        .map(|s| s.len())
        .unwrap_or(0);
    assert!(fuels > 0 && fuels <= 4);

    // The visualizer keeps the whole file.
    assert_eq!(RELATIONSHIP_VISUALIZER.operating_dataset(&dataset).len(), 150);
    Ok(())
}

#[test]
fn female_subset_filters_to_exactly_those_rows() {
    let dataset = OwnerDataset::from_records(vec![
        owner(1, "Female", 30),
        owner(2, "Male", 31),
        owner(3, "Female", 32),
        owner(4, "Other", 33),
        owner(5, "Female", 34),
    ]);

    let mut criteria = FilterCriteria::unconstrained();
    criteria.toggle_value(Field::Gender, "Female");
    let view = apply(&dataset, &criteria);

    assert_eq!(view.indices, [0, 2, 4]);
    assert_eq!(
        summary(view.len(), dataset.len()),
        "Showing 3 records filtered from total 5 owners."
    );
}

#[test]
fn age_range_keeps_both_inclusive_ends() {
    let dataset = OwnerDataset::from_records(vec![
        owner(1, "Female", 18),
        owner(2, "Male", 20),
        owner(3, "Female", 35),
        owner(4, "Other", 50),
        owner(5, "Male", 70),
    ]);

    let mut criteria = FilterCriteria::unconstrained();
    criteria.age.min = 20.0;
    criteria.age.max = 50.0;
    let view = apply(&dataset, &criteria);

    assert_eq!(view.indices, [1, 2, 3]);
}

#[test]
fn snake_case_headers_load_the_same_table() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("owners.csv");
    let mut file = std::fs::File::create(&path)?;
    writeln!(
        file,
        "owner_id,gender,ethnicity,age,income,occupation,make,model,car_age,\
         engine_size,body_style,cost,fuel_type,driving_style,is_modified,\
         mileage_per_year,service_history,number_of_owners"
    )?;
    writeln!(
        file,
        "O001,Female,Asian,34,52000,Engineer,Toyota,Corolla,5,1.6,Sedan,21000,\
         Petrol,Calm,No,12000,3,2"
    )?;
    drop(file);

    let dataset = load_file(&path)?;
    assert_eq!(dataset.len(), 1);
    let record = &dataset.records[0];
    assert_eq!(record.make, "Toyota");
    assert_eq!(record.cost, 21000.0);
    assert!(!record.modified);
    assert_eq!(record.number_of_owners, 2);
    Ok(())
}

#[test]
fn app_state_drives_the_pipeline_and_exports_the_chart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let data_path = dir.path().join("owners.json");
    write_file(&data_path, &synth_owners(40, 3))?;

    let mut state = AppState::default();
    state.load_path(&data_path);
    assert!(state.status_message.is_none());
    assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(40));

    state.set_mode(VizMode::Sankey);
    let export_path = dir.path().join("chart.json");
    state.export_chart(&export_path)?;

    let exported: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&export_path)?)?;
    assert_eq!(exported["type"], "sankey");
    assert_eq!(
        exported["links"].as_array().map(|a| a.len()),
        Some(state.view.len())
    );
    Ok(())
}

#[test]
fn bad_files_fail_loudly_and_leave_state_usable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let good = dir.path().join("good.csv");
    write_csv(&good, &synth_owners(10, 1))?;
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "just,some,headers\n1,2,3\n")?;

    let mut state = AppState::default();
    state.load_path(&good);
    assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(10));

    state.load_path(&bad);
    // The failed load is reported and the previous dataset stays active.
    assert!(state.status_message.is_some());
    assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(10));
    Ok(())
}
