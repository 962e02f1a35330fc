// UNESCO World Heritage site table (WHC001 export).
//
// Coordinates arrive as a single quoted "lat, lon" column; everything else
// is optional and defaults to empty.
use crate::error::{ClimateError, Result};
use crate::tabular::{parse_delimited_line, strip_bom};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeritageSite {
    pub name: String,
    /// `[lon, lat]`, the order the map renderer expects. Carried by the
    /// point geometry, not the properties.
    #[serde(skip)]
    pub coordinates: [f64; 2],
    pub short_description: String,
    pub date_inscribed: String,
    pub danger: bool,
    pub category: String,
    pub main_image: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub data_lines: usize,
    pub loaded: usize,
    pub invalid_coordinates: usize,
}

/// Parse `"lat, lon"` into `[lon, lat]`, rejecting out-of-range values.
pub fn parse_coordinates(s: &str) -> Option<[f64; 2]> {
    let mut parts = s.split(',').map(|p| p.trim().parse::<f64>());
    let lat = parts.next()?.ok()?;
    let lon = parts.next()?.ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some([lon, lat])
    } else {
        None
    }
}

pub fn load_sites(text: &str) -> Result<(Vec<HeritageSite>, SiteReport)> {
    let mut lines = strip_bom(text).split('\n');
    let header: Vec<String> = lines
        .next()
        .map(parse_delimited_line)
        .unwrap_or_default()
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let column = |name: &str| header.iter().position(|h| h == name);

    let coord_idx =
        column("Coordinates").ok_or_else(|| ClimateError::MissingColumn("Coordinates".into()))?;
    let name_idx = column("Name EN");
    let desc_idx = column("Short Description EN");
    let date_idx = column("Date inscribed");
    let danger_idx = column("Danger");
    let category_idx = column("Category");
    let image_idx = column("Main Image");

    let mut report = SiteReport::default();
    let mut sites = Vec::new();

    for (i, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        report.data_lines += 1;
        let values = parse_delimited_line(line);
        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| values.get(i)).map(|v| v.trim().to_string())
        };

        let Some(raw) = field(Some(coord_idx)) else { continue };
        if raw.is_empty() {
            continue;
        }
        let Some(coordinates) = parse_coordinates(&raw) else {
            report.invalid_coordinates += 1;
            continue;
        };

        sites.push(HeritageSite {
            name: field(name_idx).unwrap_or_else(|| format!("Site {}", i + 1)),
            coordinates,
            short_description: field(desc_idx).unwrap_or_default(),
            date_inscribed: field(date_idx).unwrap_or_default(),
            danger: field(danger_idx).is_some_and(|d| d.eq_ignore_ascii_case("true")),
            category: field(category_idx).unwrap_or_default(),
            main_image: field(image_idx).unwrap_or_default(),
        });
    }

    report.loaded = sites.len();
    if sites.is_empty() {
        warn!("no valid heritage site coordinates found");
    } else {
        info!(loaded = report.loaded, invalid = report.invalid_coordinates, "heritage sites parsed");
    }
    Ok((sites, report))
}

/// Search and facet filters applied to the site list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFilter {
    pub query: String,
    /// `None` means all categories.
    pub category: Option<String>,
    /// `None` means both endangered and not.
    pub danger: Option<bool>,
}

impl SiteFilter {
    pub fn matches(&self, site: &HeritageSite) -> bool {
        if let Some(category) = &self.category {
            if !site.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(danger) = self.danger {
            if site.danger != danger {
                return false;
            }
        }
        let query = self.query.trim().to_lowercase();
        query.is_empty() || site.name.to_lowercase().contains(&query)
    }

    pub fn apply<'a>(&self, sites: &'a [HeritageSite]) -> Vec<&'a HeritageSite> {
        sites.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Point FeatureCollection of `sites` for the map renderer.
pub fn sites_to_geojson<'a, I>(sites: I) -> Result<Value>
where
    I: IntoIterator<Item = &'a HeritageSite>,
{
    let features: Vec<Value> = sites
        .into_iter()
        .map(|s| -> Result<Value> {
            Ok(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": s.coordinates },
                "properties": serde_json::to_value(s)?,
            }))
        })
        .collect::<Result<_>>()?;
    Ok(json!({ "type": "FeatureCollection", "features": features }))
}
