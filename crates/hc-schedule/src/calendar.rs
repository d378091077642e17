//! Weekday → day profile mapping.

use chrono::Weekday;
use serde::Serialize;

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Day profile index per weekday, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeeklyCalendar {
    days: [usize; 7],
}

impl WeeklyCalendar {
    pub(crate) fn new(days: [usize; 7]) -> Self {
        Self { days }
    }

    pub fn day_for(&self, weekday: Weekday) -> usize {
        self.days[weekday.num_days_from_monday() as usize]
    }

    /// `(weekday, day index)` pairs, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, usize)> + '_ {
        WEEK.iter().map(|&day| (day, self.day_for(day)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_by_weekday() {
        let calendar = WeeklyCalendar::new([0, 0, 0, 0, 0, 1, 1]);
        assert_eq!(calendar.day_for(Weekday::Mon), 0);
        assert_eq!(calendar.day_for(Weekday::Sun), 1);
        let weekend: Vec<_> = calendar.iter().filter(|&(_, d)| d == 1).map(|(w, _)| w).collect();
        assert_eq!(weekend, vec![Weekday::Sat, Weekday::Sun]);
    }
}
