//! Two-click date-range picker shared by every calendar in the dashboard.
//!
//! A picker is parametrized by the date pair it drives; selection, text
//! entry and month-grid layout are the same for all of them.

use crate::error::{ClimateError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Cells in a month view (6 rows of 7 days).
pub const GRID_CELLS: usize = 42;

/// Which date pair a picker reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBinding {
    /// Acquisition window for satellite imagery products.
    Sentinel,
    /// Range used by the data tab plots.
    DataTab,
    /// Popup opened from the range button; shares the data tab range.
    Popup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub binding: DateBinding,
    pub start_label: &'static str,
    pub end_label: &'static str,
}

impl PickerConfig {
    pub fn new(binding: DateBinding) -> Self {
        let (start_label, end_label) = match binding {
            DateBinding::Sentinel => ("Sentinel start", "Sentinel end"),
            DateBinding::DataTab | DateBinding::Popup => ("Start date", "End date"),
        };
        Self { binding, start_label, end_label }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub current_month: bool,
    pub today: bool,
    pub selected: bool,
    pub in_range: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangePicker {
    config: PickerConfig,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    /// First day of the displayed month.
    view: NaiveDate,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Format as `dd/mm/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse `dd/mm/yyyy`, rejecting dates that do not exist (e.g. 31/02/2024).
pub fn parse_date_input(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return Err(ClimateError::InvalidDate(s.to_string()));
    }
    let nums: Option<Vec<u32>> = parts.iter().map(|p| p.trim().parse::<u32>().ok()).collect();
    match nums.as_deref() {
        Some(&[day, month, year]) => i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
            .ok_or_else(|| ClimateError::InvalidDate(s.to_string())),
        _ => Err(ClimateError::InvalidDate(s.to_string())),
    }
}

impl DateRangePicker {
    pub fn new(config: PickerConfig, today: NaiveDate) -> Self {
        Self { config, start: None, end: None, view: first_of_month(today) }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Both ends, once the range is complete.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }

    pub fn view_month(&self) -> NaiveDate {
        self.view
    }

    /// Select a day. Empty -> start; start only -> end (swapped if earlier);
    /// complete -> restart from the clicked day.
    pub fn click(&mut self, date: NaiveDate) {
        match (self.start, self.end) {
            (Some(start), None) if date < start => {
                self.end = Some(start);
                self.start = Some(date);
            }
            (Some(_), None) => self.end = Some(date),
            _ => {
                self.start = Some(date);
                self.end = None;
            }
        }
    }

    /// Typed start date. Blank clears it; unparseable text leaves it unchanged.
    pub fn set_start_text(&mut self, text: &str) -> Result<()> {
        self.start = Self::typed(text)?;
        Ok(())
    }

    pub fn set_end_text(&mut self, text: &str) -> Result<()> {
        self.end = Self::typed(text)?;
        Ok(())
    }

    fn typed(text: &str) -> Result<Option<NaiveDate>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        parse_date_input(text).map(Some)
    }

    pub fn clear(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Open the view on the start date, else the end date, else `today`.
    pub fn open(&mut self, today: NaiveDate) {
        self.view = first_of_month(self.start.or(self.end).unwrap_or(today));
    }

    pub fn prev_month(&mut self) {
        if let Some(d) = self.view.checked_sub_months(Months::new(1)) {
            self.view = d;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(d) = self.view.checked_add_months(Months::new(1)) {
            self.view = d;
        }
    }

    /// 42 cells starting on the Sunday on or before the first of the month.
    pub fn month_grid(&self, today: NaiveDate) -> Vec<DayCell> {
        let lead = self.view.weekday().num_days_from_sunday() as i64;
        let first_cell = self.view - Duration::days(lead);
        (0..GRID_CELLS as i64)
            .map(|i| {
                let date = first_cell + Duration::days(i);
                let current_month = date.month() == self.view.month() && date.year() == self.view.year();
                let selected = current_month && (Some(date) == self.start || Some(date) == self.end);
                let in_range = current_month
                    && self.range().is_some_and(|(s, e)| s <= date && date <= e);
                DayCell {
                    date,
                    current_month,
                    today: current_month && date == today,
                    selected,
                    in_range,
                }
            })
            .collect()
    }

    /// Input-box text for each end, as the data tab shows it.
    pub fn summary(&self) -> (String, String) {
        (
            self.start.map(format_date).unwrap_or_default(),
            self.end.map(format_date).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn picker() -> DateRangePicker {
        DateRangePicker::new(PickerConfig::new(DateBinding::DataTab), d(2024, 3, 15))
    }

    #[test]
    fn two_clicks_make_a_range() {
        let mut p = picker();
        p.click(d(2024, 3, 5));
        assert_eq!(p.range(), None);
        p.click(d(2024, 3, 20));
        assert_eq!(p.range(), Some((d(2024, 3, 5), d(2024, 3, 20))));
    }

    #[test]
    fn earlier_second_click_swaps() {
        let mut p = picker();
        p.click(d(2024, 3, 20));
        p.click(d(2024, 3, 5));
        assert_eq!(p.range(), Some((d(2024, 3, 5), d(2024, 3, 20))));
    }

    #[test]
    fn third_click_restarts() {
        let mut p = picker();
        p.click(d(2024, 3, 5));
        p.click(d(2024, 3, 20));
        p.click(d(2024, 4, 1));
        assert_eq!(p.start(), Some(d(2024, 4, 1)));
        assert_eq!(p.end(), None);
    }

    #[test]
    fn typed_dates() {
        let mut p = picker();
        p.set_start_text("01/02/2024").unwrap();
        assert_eq!(p.start(), Some(d(2024, 2, 1)));
        assert!(p.set_end_text("31/02/2024").is_err());
        assert_eq!(p.end(), None);
        assert!(p.set_start_text("garbage").is_err());
        assert_eq!(p.start(), Some(d(2024, 2, 1)));
        p.set_start_text("  ").unwrap();
        assert_eq!(p.start(), None);
    }

    #[test]
    fn format_round_trips_input() {
        assert_eq!(format_date(d(2024, 2, 1)), "01/02/2024");
        assert_eq!(parse_date_input(" 01/02/2024 ").unwrap(), d(2024, 2, 1));
        assert!(parse_date_input("2024-02-01").is_err());
    }

    #[test]
    fn grid_layout_and_flags() {
        // March 2024 starts on a Friday.
        let mut p = picker();
        p.click(d(2024, 3, 5));
        p.click(d(2024, 3, 7));
        let grid = p.month_grid(d(2024, 3, 15));
        assert_eq!(grid.len(), GRID_CELLS);
        assert_eq!(grid[0].date, d(2024, 2, 25));
        assert!(!grid[0].current_month);
        assert_eq!(grid[5].date, d(2024, 3, 1));
        assert!(grid[5].current_month);

        let cell = |day: u32| grid.iter().find(|c| c.date == d(2024, 3, day)).copied().unwrap();
        // Endpoints are both selected and in range.
        assert!(cell(5).selected && cell(5).in_range);
        assert!(cell(6).in_range && !cell(6).selected);
        assert!(cell(7).selected && cell(7).in_range);
        assert!(!cell(4).in_range);
        assert!(!cell(8).in_range);
        assert!(cell(15).today);
    }

    #[test]
    fn navigation_and_open() {
        let mut p = picker();
        p.next_month();
        assert_eq!(p.view_month(), d(2024, 4, 1));
        p.prev_month();
        p.prev_month();
        assert_eq!(p.view_month(), d(2024, 2, 1));
        p.click(d(2023, 12, 24));
        p.open(d(2024, 3, 15));
        assert_eq!(p.view_month(), d(2023, 12, 1));
        p.clear();
        p.open(d(2024, 3, 15));
        assert_eq!(p.view_month(), d(2024, 3, 1));
    }

    #[test]
    fn sentinel_config_labels() {
        let cfg = PickerConfig::new(DateBinding::Sentinel);
        assert_eq!(cfg.start_label, "Sentinel start");
        assert_eq!(picker().summary(), (String::new(), String::new()));
    }
}
