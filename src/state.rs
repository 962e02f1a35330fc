//! Single-owner application state and the readiness signal for the map collaborator.

use crate::boundaries::BoundaryCollection;
use crate::calendar::{DateBinding, DateRangePicker, PickerConfig};
use crate::climate::{self, Annotation};
use crate::error::{ClimateError, Result};
use crate::sites::{HeritageSite, SiteFilter};
use crate::timeline::Timeline;
use crate::types::{ClimateLookup, ClimateRecord, LegendRange, Percentile, Period};
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use tracing::debug;

/// A value resolved exactly once by a collaborator and awaited by callers.
#[derive(Debug)]
pub struct Readiness<T> {
    cell: OnceCell<T>,
}

impl<T> Default for Readiness<T> {
    fn default() -> Self {
        Self { cell: OnceCell::new() }
    }
}

impl<T> Readiness<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, value: T) -> Result<()> {
        self.cell.set(value).map_err(|_| ClimateError::AlreadyResolved)
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Block until resolved.
    pub fn wait(&self) -> &T {
        self.cell.wait()
    }
}

/// Every change to `AppState` goes through `AppState::apply`.
#[derive(Debug, Clone)]
pub enum Update {
    ClimateLoaded { records: Vec<ClimateRecord>, boundaries: BoundaryCollection },
    SitesLoaded(Vec<HeritageSite>),
    SelectPeriod(Period),
    SelectPercentile(Percentile),
    SetYear(i32),
    Play,
    Pause,
    Tick,
    Filter(SiteFilter),
    ClickDate { binding: DateBinding, date: NaiveDate },
}

/// Choropleth output for the current selection.
#[derive(Debug, Clone)]
pub struct ClimateView {
    pub period: Period,
    pub percentile: Percentile,
    pub annotation: Annotation,
    pub legend: Option<LegendRange>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    lookup: Option<ClimateLookup>,
    boundaries: Option<BoundaryCollection>,
    sites: Vec<HeritageSite>,
    percentile: Percentile,
    timeline: Timeline,
    site_filter: SiteFilter,
    sentinel_dates: DateRangePicker,
    data_dates: DateRangePicker,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            lookup: None,
            boundaries: None,
            sites: Vec::new(),
            percentile: Percentile::Median,
            timeline: Timeline::default(),
            site_filter: SiteFilter::default(),
            sentinel_dates: DateRangePicker::new(PickerConfig::new(DateBinding::Sentinel), today),
            data_dates: DateRangePicker::new(PickerConfig::new(DateBinding::DataTab), today),
        }
    }

    /// Apply one update. Returns true when the choropleth needs a refresh.
    pub fn apply(&mut self, update: Update) -> bool {
        debug!(?update, "applying state update");
        match update {
            Update::ClimateLoaded { records, boundaries } => {
                // Rebuilt wholesale on every load.
                self.lookup = Some(climate::build_lookup(&records));
                self.boundaries = Some(boundaries);
                true
            }
            Update::SitesLoaded(sites) => {
                self.sites = sites;
                false
            }
            Update::SelectPeriod(period) => {
                self.timeline.select_period(period);
                true
            }
            Update::SelectPercentile(percentile) => {
                self.percentile = percentile;
                true
            }
            Update::SetYear(year) => {
                self.timeline.set_year(year);
                true
            }
            Update::Play => {
                self.timeline.play();
                false
            }
            Update::Pause => {
                self.timeline.pause();
                false
            }
            Update::Tick => {
                let before = self.timeline.year();
                before != self.timeline.tick()
            }
            Update::Filter(filter) => {
                self.site_filter = filter;
                false
            }
            Update::ClickDate { binding, date } => {
                self.picker_mut(binding).click(date);
                false
            }
        }
    }

    pub fn lookup(&self) -> Option<&ClimateLookup> {
        self.lookup.as_ref()
    }

    pub fn boundaries(&self) -> Option<&BoundaryCollection> {
        self.boundaries.as_ref()
    }

    pub fn is_climate_loaded(&self) -> bool {
        self.lookup.is_some() && self.boundaries.is_some()
    }

    pub fn period(&self) -> Period {
        self.timeline.period()
    }

    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn sites(&self) -> &[HeritageSite] {
        &self.sites
    }

    pub fn filtered_sites(&self) -> Vec<&HeritageSite> {
        self.site_filter.apply(&self.sites)
    }

    /// The popup and the data tab drive the same date pair.
    pub fn picker(&self, binding: DateBinding) -> &DateRangePicker {
        match binding {
            DateBinding::Sentinel => &self.sentinel_dates,
            DateBinding::DataTab | DateBinding::Popup => &self.data_dates,
        }
    }

    pub fn picker_mut(&mut self, binding: DateBinding) -> &mut DateRangePicker {
        match binding {
            DateBinding::Sentinel => &mut self.sentinel_dates,
            DateBinding::DataTab | DateBinding::Popup => &mut self.data_dates,
        }
    }

    /// Annotated boundaries and legend for the current selection.
    pub fn refresh(&self) -> Result<ClimateView> {
        let (Some(lookup), Some(boundaries)) = (&self.lookup, &self.boundaries) else {
            return Err(ClimateError::NotLoaded("climate data and boundaries"));
        };
        let period = self.period();
        let annotation = climate::annotate_features(boundaries, lookup, period, self.percentile);
        let legend = climate::legend_range(lookup, period, self.percentile);
        Ok(ClimateView { period, percentile: self.percentile, annotation, legend })
    }
}
