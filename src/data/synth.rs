use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field as ArrowField, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

use super::model::{yes_no, OwnerRecord};
use crate::rng::SimpleRng;

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const ETHNICITIES: [&str; 6] = ["White", "Black", "Asian", "Hispanic", "Mixed", "Other"];
const OCCUPATIONS: [&str; 9] = [
    "Engineer",
    "Doctor",
    "Artist",
    "Teacher",
    "Developer",
    "Manager",
    "Lawyer",
    "Student",
    "Unemployed",
];
const HAIR_COLORS: [&str; 7] = ["Blonde", "Brown", "Black", "Red", "Gray", "Dyed", "Bald"];
const MAKES: [(&str, &[&str]); 7] = [
    ("Toyota", &["Camry", "Corolla", "Yaris", "Prius"]),
    ("Honda", &["Civic", "Accord", "Fit", "CR-V"]),
    ("Ford", &["Focus", "Fiesta", "Mustang", "Explorer"]),
    ("BMW", &["320i", "X5", "M3", "i3"]),
    ("Audi", &["A3", "A4", "Q5", "TT"]),
    ("Skoda", &["Octavia", "Superb", "Fabia", "Kodiaq"]),
    ("Hyundai", &["Elantra", "Sonata", "Tucson", "Accent"]),
];
const BODY_STYLES: [&str; 6] = ["Sedan", "Hatchback", "SUV", "Coupe", "Convertible", "Wagon"];
const ENGINE_SIZES: [f64; 8] = [1.0, 1.2, 1.4, 1.6, 2.0, 2.2, 3.0, 4.0];
const FUEL_TYPES: [&str; 4] = ["Petrol", "Diesel", "Electric", "Hybrid"];
const DRIVING_STYLES: [&str; 3] = ["Calm", "Moderate", "Aggressive"];

/// File the generator writes by default and the app auto-loads on start.
pub const DEFAULT_DATASET_FILE: &str = "car_owner_data.csv";

/// Output column order. Canonical schema plus `HairColor`, an extra column
/// the dashboards never use; the loader ignores it.
pub const OUTPUT_COLUMNS: [&str; 19] = [
    "OwnerID",
    "Gender",
    "Ethnicity",
    "Age",
    "Income",
    "Occupation",
    "HairColor",
    "CarMake",
    "CarModel",
    "CarAge",
    "EngineSize",
    "BodyStyle",
    "CarCost",
    "FuelType",
    "DrivingStyle",
    "IsModified",
    "MileagePerYear",
    "ServiceHistory",
    "NumberOfOwners",
];

// ---------------------------------------------------------------------------
// Fabrication
// ---------------------------------------------------------------------------

/// One fabricated owner: the schema record plus the extra hair-color column.
#[derive(Debug, Clone)]
pub struct SynthOwner {
    pub record: OwnerRecord,
    pub hair_color: String,
}

/// Fabricate `count` synthetic owners, deterministically for a given seed.
///
/// Car cost follows `N(30000 − 1000·car_age + 2000·engine_size, 5000)`,
/// rounded to the nearest 100 and floored at 5000, so newer cars with
/// bigger engines trend more expensive. The owner count grows loosely with
/// car age so the timeline view has something to show.
pub fn synth_owners(count: usize, seed: u64) -> Vec<SynthOwner> {
    let mut rng = SimpleRng::new(seed);
    let mut owners = Vec::with_capacity(count);

    for i in 0..count {
        let (make, models) = *rng.choice(&MAKES);
        let car_age = rng.int_in(0, 20) as u32;
        let engine_size = *rng.choice(&ENGINE_SIZES);

        let mean = 30000.0 - car_age as f64 * 1000.0 + engine_size * 2000.0;
        let cost = ((rng.gauss(mean, 5000.0) / 100.0).round() * 100.0).max(5000.0);

        let record = OwnerRecord {
            owner_id: format!("O{:03}", i + 1),
            gender: rng.choice(&GENDERS).to_string(),
            ethnicity: rng.choice(&ETHNICITIES).to_string(),
            age: rng.int_in(18, 70) as u32,
            income: rng.int_in(15000, 200000) as f64,
            occupation: rng.choice(&OCCUPATIONS).to_string(),
            make: make.to_string(),
            model: rng.choice(models).to_string(),
            car_age,
            engine_size,
            body_style: rng.choice(&BODY_STYLES).to_string(),
            cost,
            fuel_type: rng.choice(&FUEL_TYPES).to_string(),
            driving_style: rng.choice(&DRIVING_STYLES).to_string(),
            modified: rng.next_f64() < 0.5,
            mileage_per_year: rng.int_in(5000, 30000) as u32,
            service_visits: rng.int_in(0, 6) as u32,
            number_of_owners: 1 + car_age / 6 + rng.int_in(0, 2) as u32,
        };
        owners.push(SynthOwner {
            record,
            hair_color: rng.choice(&HAIR_COLORS).to_string(),
        });
    }

    owners
}

// ---------------------------------------------------------------------------
// Writers – same three formats the loader reads
// ---------------------------------------------------------------------------

/// Write the owners to `path`, picking the format from the extension.
pub fn write_file(path: &Path, owners: &[SynthOwner]) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, owners),
        "json" => write_json(path, owners),
        "parquet" | "pq" => write_parquet(path, owners),
        other => bail!("unsupported output extension: .{other}"),
    }
}

pub fn write_csv(path: &Path, owners: &[SynthOwner]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(OUTPUT_COLUMNS)?;

    for owner in owners {
        let r = &owner.record;
        writer.write_record([
            r.owner_id.as_str(),
            r.gender.as_str(),
            r.ethnicity.as_str(),
            &r.age.to_string(),
            &r.income.to_string(),
            r.occupation.as_str(),
            owner.hair_color.as_str(),
            r.make.as_str(),
            r.model.as_str(),
            &r.car_age.to_string(),
            &r.engine_size.to_string(),
            r.body_style.as_str(),
            &r.cost.to_string(),
            r.fuel_type.as_str(),
            r.driving_style.as_str(),
            yes_no(r.modified),
            &r.mileage_per_year.to_string(),
            &r.service_visits.to_string(),
            &r.number_of_owners.to_string(),
        ])?;
    }

    writer.flush().context("flushing CSV output")?;
    Ok(())
}

pub fn write_json(path: &Path, owners: &[SynthOwner]) -> Result<()> {
    let rows: Vec<serde_json::Value> = owners
        .iter()
        .map(|owner| {
            let r = &owner.record;
            json!({
                "OwnerID": r.owner_id,
                "Gender": r.gender,
                "Ethnicity": r.ethnicity,
                "Age": r.age,
                "Income": r.income,
                "Occupation": r.occupation,
                "HairColor": owner.hair_color,
                "CarMake": r.make,
                "CarModel": r.model,
                "CarAge": r.car_age,
                "EngineSize": r.engine_size,
                "BodyStyle": r.body_style,
                "CarCost": r.cost,
                "FuelType": r.fuel_type,
                "DrivingStyle": r.driving_style,
                "IsModified": yes_no(r.modified),
                "MileagePerYear": r.mileage_per_year,
                "ServiceHistory": r.service_visits,
                "NumberOfOwners": r.number_of_owners,
            })
        })
        .collect();

    let file = std::fs::File::create(path).context("creating JSON output")?;
    serde_json::to_writer_pretty(file, &rows).context("writing JSON output")?;
    Ok(())
}

pub fn write_parquet(path: &Path, owners: &[SynthOwner]) -> Result<()> {
    let strings = |pick: fn(&SynthOwner) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(
            owners.iter().map(pick).collect::<Vec<_>>(),
        ))
    };
    let ints = |pick: fn(&SynthOwner) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(
            owners.iter().map(pick).collect::<Vec<_>>(),
        ))
    };
    let floats = |pick: fn(&SynthOwner) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(
            owners.iter().map(pick).collect::<Vec<_>>(),
        ))
    };

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("OwnerID", strings(|o| &o.record.owner_id)),
        ("Gender", strings(|o| &o.record.gender)),
        ("Ethnicity", strings(|o| &o.record.ethnicity)),
        ("Age", ints(|o| o.record.age as i64)),
        ("Income", floats(|o| o.record.income)),
        ("Occupation", strings(|o| &o.record.occupation)),
        ("HairColor", strings(|o| &o.hair_color)),
        ("CarMake", strings(|o| &o.record.make)),
        ("CarModel", strings(|o| &o.record.model)),
        ("CarAge", ints(|o| o.record.car_age as i64)),
        ("EngineSize", floats(|o| o.record.engine_size)),
        ("BodyStyle", strings(|o| &o.record.body_style)),
        ("CarCost", floats(|o| o.record.cost)),
        ("FuelType", strings(|o| &o.record.fuel_type)),
        ("DrivingStyle", strings(|o| &o.record.driving_style)),
        ("IsModified", strings(|o| yes_no(o.record.modified))),
        ("MileagePerYear", ints(|o| o.record.mileage_per_year as i64)),
        ("ServiceHistory", ints(|o| o.record.service_visits as i64)),
        ("NumberOfOwners", ints(|o| o.record.number_of_owners as i64)),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, array)| ArrowField::new(*name, array.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));
    let batch = RecordBatch::try_new(
        schema.clone(),
        columns.into_iter().map(|(_, array)| array).collect(),
    )
    .context("building parquet record batch")?;

    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
