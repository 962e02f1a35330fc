//! Climate join engine: record extraction, lookup build and per-feature annotation.

use crate::boundaries::{self, BoundaryCollection};
use crate::tabular::ParsedTable;
use crate::types::{
    AnnotationStats, ClimateLookup, ClimateRecord, LegendRange, MatchTier, Percentile,
    PercentileValues, Period, ANNUAL_MEAN_TEMPERATURE,
};
use crate::util::parse_f64_safe;
use serde_json::Value;
use tracing::{debug, info};

/// Temperature written for features with no data. The renderer treats it as transparent.
pub const NO_DATA_SENTINEL: f64 = 0.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub other_metric: usize,
    pub invalid_values: usize,
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Keep the annual-mean-temperature rows of a parsed climate table.
pub fn extract_records(table: &ParsedTable) -> (Vec<ClimateRecord>, ExtractReport) {
    let mut report = ExtractReport { total_rows: table.rows.len(), ..Default::default() };
    let mut records = Vec::new();

    for row in &table.rows {
        let metric = row.get("Metric").map(|m| m.trim());
        if metric != Some(ANNUAL_MEAN_TEMPERATURE) {
            report.other_metric += 1;
            continue;
        }
        let values = (
            parse_f64_safe(row.get("Value_Low").map(String::as_str)),
            parse_f64_safe(row.get("Value_Median").map(String::as_str)),
            parse_f64_safe(row.get("Value_High").map(String::as_str)),
        );
        let (Some(low), Some(median), Some(high)) = values else {
            report.invalid_values += 1;
            continue;
        };
        let (Some(iso), Some(period)) = (row.get("ISO"), row.get("Period")) else {
            report.invalid_values += 1;
            continue;
        };
        records.push(ClimateRecord {
            region_identifier: iso.trim().to_string(),
            period: period.trim().to_string(),
            value_low: low,
            value_median: median,
            value_high: high,
        });
    }

    report.kept_rows = records.len();
    debug!(?report, "extracted climate records");
    (records, report)
}

/// Build `identifier -> period -> values`. Duplicate pairs: last row wins.
pub fn build_lookup(records: &[ClimateRecord]) -> ClimateLookup {
    let mut lookup = ClimateLookup::new();
    for r in records {
        lookup
            .entry(r.region_identifier.clone())
            .or_default()
            .insert(
                r.period.clone(),
                PercentileValues { low: r.value_low, median: r.value_median, high: r.value_high },
            );
    }
    info!(identifiers = lookup.len(), "climate lookup built");
    lookup
}

fn lookup_value(
    lookup: &ClimateLookup,
    code: &str,
    period: Period,
    percentile: Percentile,
) -> Option<f64> {
    lookup.get(code)?.get(period.label()).map(|v| v.get(percentile))
}

/// Resolve a feature's Celsius temperature, regional code first then national.
pub fn resolve_temperature(
    feature: &Value,
    lookup: &ClimateLookup,
    period: Period,
    percentile: Percentile,
) -> Option<(MatchTier, f64)> {
    let regional = boundaries::regional_code(feature)
        .and_then(|code| lookup_value(lookup, code, period, percentile))
        .map(|f| (MatchTier::Regional, f));
    let matched = regional.or_else(|| {
        boundaries::national_code(feature)
            .and_then(|code| lookup_value(lookup, code, period, percentile))
            .map(|f| (MatchTier::National, f))
    });
    matched.map(|(tier, f)| (tier, fahrenheit_to_celsius(f)))
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub collection: BoundaryCollection,
    pub stats: AnnotationStats,
}

/// Produce an annotated copy of `collection` with a `temperature` on every feature.
pub fn annotate_features(
    collection: &BoundaryCollection,
    lookup: &ClimateLookup,
    period: Period,
    percentile: Percentile,
) -> Annotation {
    let mut stats = AnnotationStats::default();
    let features = collection
        .features
        .iter()
        .map(|feature| {
            let temperature = match resolve_temperature(feature, lookup, period, percentile) {
                Some((MatchTier::Regional, c)) => {
                    stats.regional += 1;
                    c
                }
                Some((MatchTier::National, c)) => {
                    stats.national += 1;
                    c
                }
                None => {
                    stats.unmatched += 1;
                    NO_DATA_SENTINEL
                }
            };
            boundaries::with_temperature(feature, temperature)
        })
        .collect();

    info!(
        %period,
        %percentile,
        regional = stats.regional,
        national = stats.national,
        unmatched = stats.unmatched,
        "annotated boundary features"
    );
    Annotation { collection: BoundaryCollection { features }, stats }
}

/// Celsius extrema across identifiers that have `period`; `None` if none do.
pub fn legend_range(
    lookup: &ClimateLookup,
    period: Period,
    percentile: Percentile,
) -> Option<LegendRange> {
    lookup
        .values()
        .filter_map(|periods| periods.get(period.label()))
        .map(|v| fahrenheit_to_celsius(v.get(percentile)))
        .fold(None, |acc: Option<LegendRange>, c| match acc {
            None => Some(LegendRange { min: c, max: c }),
            Some(r) => Some(LegendRange { min: r.min.min(c), max: r.max.max(c) }),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::parse_table;
    use serde_json::json;

    fn record(iso: &str, period: Period, low: f64, median: f64, high: f64) -> ClimateRecord {
        ClimateRecord {
            region_identifier: iso.to_string(),
            period: period.label().to_string(),
            value_low: low,
            value_median: median,
            value_high: high,
        }
    }

    fn feature(props: Value) -> Value {
        json!({ "type": "Feature", "geometry": null, "properties": props })
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn conversion_fixed_points() {
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
    }

    #[test]
    fn extract_filters_metric_and_bad_values() {
        let text = "ISO,Period,Metric,Value_Low,Value_Median,Value_High\n\
                    USA,Historical 1986-2005,tas_annual,50,60,70\n\
                    USA,Historical 1986-2005,pr_annual,1,2,3\n\
                    FRA,Historical 1986-2005,tas_annual,x,52,54\n\
                    DEU,Midcentury 2040-2059, tas_annual ,40,45,50\n";
        let (records, report) = extract_records(&parse_table(text));
        assert_eq!(records.len(), 2);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.other_metric, 1);
        assert_eq!(report.invalid_values, 1);
        assert_eq!(records[0].region_identifier, "USA");
        assert_eq!(records[1].value_high, 50.0);
    }

    #[test]
    fn bom_prefixed_export_keeps_iso_column() {
        let text = "\u{feff}ISO,Period,Metric,Value_Low,Value_Median,Value_High\r\n\
                    USA,Historical 1986-2005,tas_annual,50,60,70\r\n";
        let (records, report) = extract_records(&parse_table(text));
        assert_eq!(report.invalid_values, 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region_identifier, "USA");
    }

    #[test]
    fn build_lookup_is_idempotent_and_last_row_wins() {
        let records = vec![
            record("USA", Period::Historical, 50.0, 60.0, 70.0),
            record("USA", Period::Historical, 51.0, 61.0, 71.0),
            record("USA", Period::Midcentury, 55.0, 65.0, 75.0),
        ];
        let a = build_lookup(&records);
        let b = build_lookup(&records);
        assert_eq!(a, b);
        assert_eq!(a["USA"][Period::Historical.label()].median, 61.0);
        assert_eq!(a["USA"].len(), 2);
    }

    #[test]
    fn regional_tier_takes_priority() {
        let lookup = build_lookup(&[
            record("USA", Period::Historical, 0.0, 50.0, 0.0),
            record("USA-TX", Period::Historical, 0.0, 68.0, 0.0),
        ]);
        let coll = BoundaryCollection {
            features: vec![feature(json!({ "color_code": "USA", "region_code": "USA-TX" }))],
        };
        let out = annotate_features(&coll, &lookup, Period::Historical, Percentile::Median);
        assert!(approx(out.collection.features[0]["properties"]["temperature"].as_f64().unwrap(), 20.0));
        assert_eq!(out.stats, AnnotationStats { regional: 1, national: 0, unmatched: 0 });
    }

    #[test]
    fn national_tier_when_regional_missing() {
        let lookup = build_lookup(&[record("USA", Period::Historical, 0.0, 50.0, 0.0)]);
        let coll = BoundaryCollection {
            features: vec![feature(json!({ "color_code": "USA", "region_code": "USA-ZZ" }))],
        };
        let out = annotate_features(&coll, &lookup, Period::Historical, Percentile::Median);
        assert!(approx(out.collection.features[0]["properties"]["temperature"].as_f64().unwrap(), 10.0));
        assert_eq!(out.stats.national, 1);
    }

    #[test]
    fn national_tier_when_regional_lacks_period() {
        let lookup = build_lookup(&[
            record("USA", Period::Midcentury, 0.0, 50.0, 0.0),
            record("USA-TX", Period::Historical, 0.0, 68.0, 0.0),
        ]);
        let f = feature(json!({ "color_code": "USA", "region_code": "USA-TX" }));
        let resolved = resolve_temperature(&f, &lookup, Period::Midcentury, Percentile::Median);
        assert_eq!(resolved.map(|(tier, _)| tier), Some(MatchTier::National));
    }

    #[test]
    fn unresolvable_feature_gets_sentinel() {
        let lookup = build_lookup(&[record("USA", Period::Historical, 0.0, 50.0, 0.0)]);
        let coll = BoundaryCollection {
            features: vec![
                feature(json!({ "color_code": "ATA" })),
                json!({ "type": "Feature" }),
            ],
        };
        let out = annotate_features(&coll, &lookup, Period::Historical, Percentile::Median);
        for f in &out.collection.features {
            assert_eq!(f["properties"]["temperature"].as_f64(), Some(0.0));
        }
        assert_eq!(out.stats.unmatched, 2);
        assert_eq!(out.stats.total(), 2);
    }

    #[test]
    fn annotation_leaves_source_untouched() {
        let lookup = build_lookup(&[record("USA", Period::Historical, 0.0, 50.0, 0.0)]);
        let coll = BoundaryCollection { features: vec![feature(json!({ "color_code": "USA" }))] };
        let before = coll.clone();
        let _ = annotate_features(&coll, &lookup, Period::Historical, Percentile::Median);
        assert_eq!(coll, before);
    }

    #[test]
    fn legend_range_over_period() {
        let lookup = build_lookup(&[
            record("USA", Period::Historical, 0.0, 50.0, 0.0),
            record("FRA", Period::Historical, 0.0, 212.0, 0.0),
            record("DEU", Period::Midcentury, 0.0, -40.0, 0.0),
        ]);
        let range = legend_range(&lookup, Period::Historical, Percentile::Median).unwrap();
        assert!(approx(range.min, 10.0));
        assert!(approx(range.max, 100.0));
    }

    #[test]
    fn legend_range_without_coverage_is_none() {
        let lookup = build_lookup(&[record("USA", Period::Historical, 0.0, 50.0, 0.0)]);
        assert_eq!(legend_range(&lookup, Period::EndOfCentury, Percentile::High), None);
        assert_eq!(legend_range(&ClimateLookup::new(), Period::Historical, Percentile::Low), None);
    }

    #[test]
    fn end_to_end_usa_median() {
        let text = "ISO,Period,Metric,Value_Low,Value_Median,Value_High\n\
                    USA,Historical 1986-2005,tas_annual,50,60,70\n";
        let (records, _) = extract_records(&parse_table(text));
        let lookup = build_lookup(&records);
        let coll = BoundaryCollection::from_json_str(
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"name":"United States","color_code":"USA"}}]}"#,
        )
        .unwrap();
        let period: Period = "1986-2005".parse().unwrap();
        let percentile = Percentile::from_number(50).unwrap();
        let out = annotate_features(&coll, &lookup, period, percentile);
        let t = out.collection.features[0]["properties"]["temperature"].as_f64().unwrap();
        assert!((t - 15.555_555).abs() < 1e-3);
        assert!(format!("{:.2}", t) == "15.56");
    }
}
