use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::rng::SimpleRng;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of an owner record, dynamically typed
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. Filter option lists and distinct-value
/// domains live in `BTreeSet`s downstream, so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
}

// -- Manual Eq/Ord so we can put FieldValue in BTreeSet --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Int(_) => 0,
                Float(_) => 1,
                Str(_) => 2,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Str(s) => s.hash(state),
            FieldValue::Int(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{s}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl FieldValue {
    /// Interpret the value as an `f64` for range filters and size/axis
    /// encodings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Str(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Field – the fixed owner-record schema
// ---------------------------------------------------------------------------

/// How a field behaves in filters and charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unique row identity; never filtered on.
    Identity,
    /// String-valued dimension whose domain is derived from the data.
    Categorical,
    /// Numeric dimension with dataset bounds.
    Numeric,
    /// Boolean-like Yes/No dimension.
    Flag,
}

/// One column of the owner schema.
///
/// The canonical column names are the CamelCase headers the generator
/// writes; the flattened-lowercase names used by the second dashboard
/// variant are accepted as aliases when loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    OwnerId,
    Gender,
    Ethnicity,
    Age,
    Income,
    Occupation,
    Make,
    Model,
    CarAge,
    EngineSize,
    BodyStyle,
    Cost,
    FuelType,
    DrivingStyle,
    Modified,
    MileagePerYear,
    ServiceVisits,
    NumberOfOwners,
}

impl Field {
    pub const ALL: [Field; 18] = [
        Field::OwnerId,
        Field::Gender,
        Field::Ethnicity,
        Field::Age,
        Field::Income,
        Field::Occupation,
        Field::Make,
        Field::Model,
        Field::CarAge,
        Field::EngineSize,
        Field::BodyStyle,
        Field::Cost,
        Field::FuelType,
        Field::DrivingStyle,
        Field::Modified,
        Field::MileagePerYear,
        Field::ServiceVisits,
        Field::NumberOfOwners,
    ];

    /// Canonical column header.
    pub fn column(self) -> &'static str {
        match self {
            Field::OwnerId => "OwnerID",
            Field::Gender => "Gender",
            Field::Ethnicity => "Ethnicity",
            Field::Age => "Age",
            Field::Income => "Income",
            Field::Occupation => "Occupation",
            Field::Make => "CarMake",
            Field::Model => "CarModel",
            Field::CarAge => "CarAge",
            Field::EngineSize => "EngineSize",
            Field::BodyStyle => "BodyStyle",
            Field::Cost => "CarCost",
            Field::FuelType => "FuelType",
            Field::DrivingStyle => "DrivingStyle",
            Field::Modified => "IsModified",
            Field::MileagePerYear => "MileagePerYear",
            Field::ServiceVisits => "ServiceHistory",
            Field::NumberOfOwners => "NumberOfOwners",
        }
    }

    /// Alternative headers accepted on load (the flattened-lowercase schema).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::OwnerId => &["owner_id"],
            Field::Gender => &["gender"],
            Field::Ethnicity => &["ethnicity"],
            Field::Age => &["age"],
            Field::Income => &["income"],
            Field::Occupation => &["occupation"],
            Field::Make => &["make", "car_make"],
            Field::Model => &["model", "car_model"],
            Field::CarAge => &["car_age"],
            Field::EngineSize => &["engine_size"],
            Field::BodyStyle => &["body_style"],
            Field::Cost => &["cost", "car_cost"],
            Field::FuelType => &["fuel_type"],
            Field::DrivingStyle => &["driving_style"],
            Field::Modified => &["is_modified", "modified"],
            Field::MileagePerYear => &["mileage_per_year"],
            Field::ServiceVisits => &["service_history", "service_visits"],
            Field::NumberOfOwners => &["number_of_owners"],
        }
    }

    /// Resolve a file header to a schema field, canonical name first.
    pub fn from_header(header: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.column() == header || f.aliases().contains(&header))
    }

    /// Human-readable label for panels, axes and tooltips.
    pub fn label(self) -> &'static str {
        match self {
            Field::OwnerId => "Owner ID",
            Field::Gender => "Gender",
            Field::Ethnicity => "Ethnicity",
            Field::Age => "Age",
            Field::Income => "Income",
            Field::Occupation => "Occupation",
            Field::Make => "Car make",
            Field::Model => "Car model",
            Field::CarAge => "Car age",
            Field::EngineSize => "Engine size",
            Field::BodyStyle => "Body style",
            Field::Cost => "Car cost",
            Field::FuelType => "Fuel type",
            Field::DrivingStyle => "Driving style",
            Field::Modified => "Modified",
            Field::MileagePerYear => "Mileage / year",
            Field::ServiceVisits => "Service visits",
            Field::NumberOfOwners => "Owners",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::OwnerId => FieldKind::Identity,
            Field::Gender
            | Field::Ethnicity
            | Field::Occupation
            | Field::Make
            | Field::Model
            | Field::BodyStyle
            | Field::FuelType
            | Field::DrivingStyle => FieldKind::Categorical,
            Field::Age
            | Field::Income
            | Field::CarAge
            | Field::EngineSize
            | Field::Cost
            | Field::MileagePerYear
            | Field::ServiceVisits
            | Field::NumberOfOwners => FieldKind::Numeric,
            Field::Modified => FieldKind::Flag,
        }
    }
}

// Fields serialize as their canonical column name so exported chart specs
// speak the file schema.
impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// OwnerRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single synthetic car owner (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRecord {
    pub owner_id: String,
    pub gender: String,
    pub ethnicity: String,
    pub age: u32,
    pub income: f64,
    pub occupation: String,
    pub make: String,
    pub model: String,
    pub car_age: u32,
    pub engine_size: f64,
    pub body_style: String,
    pub cost: f64,
    pub fuel_type: String,
    pub driving_style: String,
    pub modified: bool,
    pub mileage_per_year: u32,
    pub service_visits: u32,
    pub number_of_owners: u32,
}

impl Default for OwnerRecord {
    fn default() -> Self {
        OwnerRecord {
            owner_id: String::new(),
            gender: String::new(),
            ethnicity: String::new(),
            age: 0,
            income: 0.0,
            occupation: String::new(),
            make: String::new(),
            model: String::new(),
            car_age: 0,
            engine_size: 1.0,
            body_style: String::new(),
            cost: 0.0,
            fuel_type: String::new(),
            driving_style: String::new(),
            modified: false,
            mileage_per_year: 0,
            service_visits: 0,
            number_of_owners: 1,
        }
    }
}

impl OwnerRecord {
    /// The cell value for a schema field. The modified flag surfaces as the
    /// Yes/No strings it is serialized with.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::OwnerId => FieldValue::Str(self.owner_id.clone()),
            Field::Gender => FieldValue::Str(self.gender.clone()),
            Field::Ethnicity => FieldValue::Str(self.ethnicity.clone()),
            Field::Age => FieldValue::Int(self.age as i64),
            Field::Income => FieldValue::Float(self.income),
            Field::Occupation => FieldValue::Str(self.occupation.clone()),
            Field::Make => FieldValue::Str(self.make.clone()),
            Field::Model => FieldValue::Str(self.model.clone()),
            Field::CarAge => FieldValue::Int(self.car_age as i64),
            Field::EngineSize => FieldValue::Float(self.engine_size),
            Field::BodyStyle => FieldValue::Str(self.body_style.clone()),
            Field::Cost => FieldValue::Float(self.cost),
            Field::FuelType => FieldValue::Str(self.fuel_type.clone()),
            Field::DrivingStyle => FieldValue::Str(self.driving_style.clone()),
            Field::Modified => FieldValue::Str(yes_no(self.modified).to_string()),
            Field::MileagePerYear => FieldValue::Int(self.mileage_per_year as i64),
            Field::ServiceVisits => FieldValue::Int(self.service_visits as i64),
            Field::NumberOfOwners => FieldValue::Int(self.number_of_owners as i64),
        }
    }

    /// The cell as a number, `None` for string-valued fields.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        self.value(field).as_f64()
    }
}

/// Serialized form of the modified flag.
pub fn yes_no(modified: bool) -> &'static str {
    if modified {
        "Yes"
    } else {
        "No"
    }
}

// ---------------------------------------------------------------------------
// OwnerDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed per-field indices.
///
/// Immutable after construction: the dashboards only ever read it. The
/// distinct-value domains drive the filter option lists, so they are a
/// property of the loaded data: loading (or sampling) a different dataset
/// yields different option lists.
#[derive(Debug, Clone)]
pub struct OwnerDataset {
    /// All owner records (rows), in file order.
    pub records: Vec<OwnerRecord>,
    /// For each categorical/flag field the sorted set of observed values.
    distinct: BTreeMap<Field, BTreeSet<FieldValue>>,
    /// For each numeric field the observed (min, max).
    bounds: BTreeMap<Field, (f64, f64)>,
}

impl OwnerDataset {
    /// Build the per-field indices from the loaded records.
    pub fn from_records(records: Vec<OwnerRecord>) -> Self {
        let mut distinct: BTreeMap<Field, BTreeSet<FieldValue>> = BTreeMap::new();
        let mut bounds: BTreeMap<Field, (f64, f64)> = BTreeMap::new();

        for record in &records {
            for field in Field::ALL {
                match field.kind() {
                    FieldKind::Categorical | FieldKind::Flag => {
                        distinct
                            .entry(field)
                            .or_default()
                            .insert(record.value(field));
                    }
                    FieldKind::Numeric => {
                        // numeric() is always Some for Numeric fields
                        if let Some(v) = record.numeric(field) {
                            bounds
                                .entry(field)
                                .and_modify(|(lo, hi)| {
                                    *lo = lo.min(v);
                                    *hi = hi.max(v);
                                })
                                .or_insert((v, v));
                        }
                    }
                    FieldKind::Identity => {}
                }
            }
        }

        OwnerDataset {
            records,
            distinct,
            bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted observed values of a categorical or flag field, used to
    /// populate the filter option lists.
    pub fn distinct_values(&self, field: Field) -> Option<&BTreeSet<FieldValue>> {
        self.distinct.get(&field)
    }

    /// Observed (min, max) of a numeric field, used to seed range-filter
    /// spans.
    pub fn bounds(&self, field: Field) -> Option<(f64, f64)> {
        self.bounds.get(&field).copied()
    }

    /// A deterministic sub-sample of `rows` records (all of them when the
    /// dataset is smaller). The result is an order-preserving subsequence
    /// and its domains/bounds are recomputed, so option lists reflect the
    /// sample rather than the source file.
    pub fn sample(&self, rows: usize, seed: u64) -> OwnerDataset {
        if rows >= self.records.len() {
            return self.clone();
        }

        // Partial Fisher-Yates: draw `rows` distinct indices, then restore
        // file order.
        let mut rng = SimpleRng::new(seed);
        let mut indices: Vec<usize> = (0..self.records.len()).collect();
        for i in 0..rows {
            let j = i + rng.index(indices.len() - i);
            indices.swap(i, j);
        }
        let mut picked: Vec<usize> = indices[..rows].to_vec();
        picked.sort_unstable();

        let records = picked
            .into_iter()
            .map(|i| self.records[i].clone())
            .collect();
        OwnerDataset::from_records(records)
    }
}
