use crate::boundaries::BoundaryCollection;
use crate::climate::{legend_range, resolve_temperature};
use crate::sites::HeritageSite;
use crate::state::ClimateView;
use crate::types::{
    AnnotationStats, ClimateLookup, MatchTier, Percentile, Period, SiteRow, SummaryStats,
    TierSummaryRow,
};
use crate::util::format_number;

const PERCENTILES: [Percentile; 3] = [Percentile::Low, Percentile::Median, Percentile::High];

/// Match-tier counts and legend range for every period/percentile pair.
pub fn tier_summary(lookup: &ClimateLookup, boundaries: &BoundaryCollection) -> Vec<TierSummaryRow> {
    let mut rows = Vec::with_capacity(Period::ALL.len() * PERCENTILES.len());
    for period in Period::ALL {
        for percentile in PERCENTILES {
            let mut stats = AnnotationStats::default();
            for feature in &boundaries.features {
                match resolve_temperature(feature, lookup, period, percentile) {
                    Some((MatchTier::Regional, _)) => stats.regional += 1,
                    Some((MatchTier::National, _)) => stats.national += 1,
                    None => stats.unmatched += 1,
                }
            }
            let legend = legend_range(lookup, period, percentile);
            let fmt = |v: Option<f64>| v.map(|c| format_number(c, 1)).unwrap_or_else(|| "-".into());
            rows.push(TierSummaryRow {
                period: period.key().to_string(),
                percentile: percentile.number(),
                regional: stats.regional,
                national: stats.national,
                unmatched: stats.unmatched,
                legend_min: fmt(legend.map(|l| l.min)),
                legend_max: fmt(legend.map(|l| l.max)),
            });
        }
    }
    rows
}

pub fn site_rows<'a, I>(sites: I) -> Vec<SiteRow>
where
    I: IntoIterator<Item = &'a HeritageSite>,
{
    sites
        .into_iter()
        .map(|s| SiteRow {
            name: s.name.clone(),
            category: s.category.clone(),
            date_inscribed: s.date_inscribed.clone(),
            danger: s.danger,
            lon: format_number(s.coordinates[0], 4),
            lat: format_number(s.coordinates[1], 4),
        })
        .collect()
}

pub fn generate_summary(lookup: &ClimateLookup, view: &ClimateView) -> SummaryStats {
    let stats = view.annotation.stats;
    SummaryStats {
        period: view.period.key().to_string(),
        percentile: view.percentile.number(),
        identifiers: lookup.len(),
        features: stats.total(),
        matched: stats.matched(),
        regional_matches: stats.regional,
        national_matches: stats.national,
        unmatched: stats.unmatched,
        legend: view.legend,
    }
}
