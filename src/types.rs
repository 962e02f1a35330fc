use crate::error::ClimateError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Metric value retained from the climate table (annual mean temperature).
pub const ANNUAL_MEAN_TEMPERATURE: &str = "tas_annual";

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateRecord {
    pub region_identifier: String,
    pub period: String,
    pub value_low: f64,
    pub value_median: f64,
    pub value_high: f64,
}

/// One of the four projection windows shown on the time slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Historical,
    NextDecades,
    Midcentury,
    EndOfCentury,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::Historical,
        Period::NextDecades,
        Period::Midcentury,
        Period::EndOfCentury,
    ];

    /// Label used in the `Period` column of the climate table.
    pub fn label(self) -> &'static str {
        match self {
            Period::Historical => "Historical 1986-2005",
            Period::NextDecades => "Next decades 2020-2039",
            Period::Midcentury => "Midcentury 2040-2059",
            Period::EndOfCentury => "End of century 2080-2099",
        }
    }

    /// Short key used by the period selector.
    pub fn key(self) -> &'static str {
        match self {
            Period::Historical => "1986-2005",
            Period::NextDecades => "2020-2039",
            Period::Midcentury => "2040-2059",
            Period::EndOfCentury => "2080-2099",
        }
    }

    pub fn from_label(label: &str) -> Option<Period> {
        let label = label.trim();
        Period::ALL.into_iter().find(|p| p.label() == label)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Period {
    type Err = ClimateError;

    /// Accepts either the short key (`2040-2059`) or the full table label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .or_else(|| Period::from_label(s))
            .ok_or_else(|| ClimateError::UnknownPeriod(s.to_string()))
    }
}

/// Confidence level of a projection value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Percentile {
    Low,
    Median,
    High,
}

impl Percentile {
    pub fn number(self) -> u8 {
        match self {
            Percentile::Low => 5,
            Percentile::Median => 50,
            Percentile::High => 95,
        }
    }

    pub fn from_number(n: u8) -> Option<Percentile> {
        match n {
            5 => Some(Percentile::Low),
            50 => Some(Percentile::Median),
            95 => Some(Percentile::High),
            _ => None,
        }
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.number())
    }
}

impl FromStr for Percentile {
    type Err = ClimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['p', 'P']);
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(Percentile::from_number)
            .ok_or_else(|| ClimateError::UnknownPercentile(s.to_string()))
    }
}

/// Fahrenheit values for the three percentile columns of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileValues {
    pub low: f64,
    pub median: f64,
    pub high: f64,
}

impl PercentileValues {
    pub fn get(&self, percentile: Percentile) -> f64 {
        match percentile {
            Percentile::Low => self.low,
            Percentile::Median => self.median,
            Percentile::High => self.high,
        }
    }
}

/// region identifier -> period label -> values
pub type ClimateLookup = HashMap<String, HashMap<String, PercentileValues>>;

/// Celsius extrema for the legend labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendRange {
    pub min: f64,
    pub max: f64,
}

/// Which join key produced a feature's temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Regional,
    National,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationStats {
    pub regional: usize,
    pub national: usize,
    pub unmatched: usize,
}

impl AnnotationStats {
    pub fn total(&self) -> usize {
        self.regional + self.national + self.unmatched
    }

    pub fn matched(&self) -> usize {
        self.regional + self.national
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TierSummaryRow {
    #[serde(rename = "Period")]
    #[tabled(rename = "Period")]
    pub period: String,
    #[serde(rename = "Percentile")]
    #[tabled(rename = "Percentile")]
    pub percentile: u8,
    #[serde(rename = "Regional")]
    #[tabled(rename = "Regional")]
    pub regional: usize,
    #[serde(rename = "National")]
    #[tabled(rename = "National")]
    pub national: usize,
    #[serde(rename = "Unmatched")]
    #[tabled(rename = "Unmatched")]
    pub unmatched: usize,
    #[serde(rename = "LegendMinC")]
    #[tabled(rename = "LegendMinC")]
    pub legend_min: String,
    #[serde(rename = "LegendMaxC")]
    #[tabled(rename = "LegendMaxC")]
    pub legend_max: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SiteRow {
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Inscribed")]
    #[tabled(rename = "Inscribed")]
    pub date_inscribed: String,
    #[serde(rename = "Danger")]
    #[tabled(rename = "Danger")]
    pub danger: bool,
    #[serde(rename = "Lon")]
    #[tabled(rename = "Lon")]
    pub lon: String,
    #[serde(rename = "Lat")]
    #[tabled(rename = "Lat")]
    pub lat: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub period: String,
    pub percentile: u8,
    pub identifiers: usize,
    pub features: usize,
    pub matched: usize,
    pub regional_matches: usize,
    pub national_matches: usize,
    pub unmatched: usize,
    pub legend: Option<LegendRange>,
}
