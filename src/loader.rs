use crate::boundaries::BoundaryCollection;
use crate::climate::extract_records;
use crate::error::Result;
use crate::sites::{self, HeritageSite, SiteReport};
use crate::source::fetch_text;
use crate::tabular::parse_table;
use crate::types::ClimateRecord;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
    pub other_metric: usize,
    pub invalid_values: usize,
    pub features: usize,
}

/// Fetch and decode the climate table, then the boundary collection.
///
/// The two fetches run one after the other; the first failure aborts the load.
pub fn load_climate(
    csv_location: &str,
    boundaries_location: &str,
) -> Result<(Vec<ClimateRecord>, BoundaryCollection, LoadReport)> {
    let text = fetch_text(csv_location)?;
    let table = parse_table(&text);
    if table.dropped_rows > 0 {
        warn!(dropped = table.dropped_rows, "climate rows dropped for column-count mismatch");
    }
    let (records, extract) = extract_records(&table);
    info!(rows = records.len(), "climate CSV loaded (filtered for tas_annual)");

    let geojson = fetch_text(boundaries_location)?;
    let boundaries = BoundaryCollection::from_json_str(&geojson)?;
    info!(features = boundaries.len(), "boundary GeoJSON loaded");

    let report = LoadReport {
        total_rows: extract.total_rows + table.dropped_rows,
        kept_rows: extract.kept_rows,
        dropped_rows: table.dropped_rows,
        other_metric: extract.other_metric,
        invalid_values: extract.invalid_values,
        features: boundaries.len(),
    };
    Ok((records, boundaries, report))
}

pub fn load_sites(location: &str) -> Result<(Vec<HeritageSite>, SiteReport)> {
    let text = fetch_text(location)?;
    sites::load_sites(&text)
}
