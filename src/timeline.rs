use crate::types::Period;
use std::ops::RangeInclusive;

impl Period {
    /// Years covered by the slider for this window.
    pub fn year_range(self) -> RangeInclusive<i32> {
        match self {
            Period::Historical => 1986..=2005,
            Period::NextDecades => 2020..=2039,
            Period::Midcentury => 2040..=2059,
            Period::EndOfCentury => 2080..=2099,
        }
    }

    pub fn default_year(self) -> i32 {
        match self {
            Period::Historical => 1995,
            Period::NextDecades => 2030,
            Period::Midcentury => 2050,
            Period::EndOfCentury => 2090,
        }
    }
}

/// Time slider position plus play/pause state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    period: Period,
    year: i32,
    playing: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Period::Historical)
    }
}

impl Timeline {
    pub fn new(period: Period) -> Self {
        Self { period, year: period.default_year(), playing: false }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Switch window; the slider jumps to the window's default year.
    pub fn select_period(&mut self, period: Period) {
        self.period = period;
        self.year = period.default_year();
    }

    pub fn set_year(&mut self, year: i32) {
        let range = self.period.year_range();
        self.year = year.clamp(*range.start(), *range.end());
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Advance one year, wrapping to the start of the window. No-op while paused.
    pub fn tick(&mut self) -> i32 {
        if self.playing {
            let range = self.period.year_range();
            self.year = if self.year >= *range.end() { *range.start() } else { self.year + 1 };
        }
        self.year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_year_inside_range() {
        for p in Period::ALL {
            assert!(p.year_range().contains(&p.default_year()));
        }
    }

    #[test]
    fn select_period_resets_year() {
        let mut t = Timeline::default();
        t.set_year(2000);
        t.select_period(Period::Midcentury);
        assert_eq!(t.year(), 2050);
        assert_eq!(t.period(), Period::Midcentury);
    }

    #[test]
    fn set_year_clamps() {
        let mut t = Timeline::new(Period::NextDecades);
        t.set_year(1900);
        assert_eq!(t.year(), 2020);
        t.set_year(3000);
        assert_eq!(t.year(), 2039);
    }

    #[test]
    fn tick_wraps_only_while_playing() {
        let mut t = Timeline::new(Period::EndOfCentury);
        t.set_year(2099);
        assert_eq!(t.tick(), 2099);
        t.play();
        assert!(t.is_playing());
        assert_eq!(t.tick(), 2080);
        assert_eq!(t.tick(), 2081);
        t.pause();
        assert_eq!(t.tick(), 2081);
    }
}
