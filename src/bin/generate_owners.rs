use std::path::PathBuf;

use anyhow::Result;

use carscope::data::synth::{synth_owners, write_file, DEFAULT_DATASET_FILE};

const ROWS: usize = 300;
const SEED: u64 = 42;

/// Fabricate the synthetic car-owner table the dashboards load.
///
/// Takes one optional argument, the output path; the extension picks the
/// format (.csv, .json, .parquet).
fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_FILE));

    let owners = synth_owners(ROWS, SEED);
    write_file(&path, &owners)?;

    println!("Wrote {} owner records to {}", owners.len(), path.display());
    Ok(())
}
