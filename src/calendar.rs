// Calendar month windows
//
// "Today" is a naive calendar date; the caller decides which time zone it
// belongs to.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Inclusive date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// True when `date` lies within the window, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// First and last day of the month containing `today`.
///
/// The last day is found by jumping to day 28, stepping four days forward
/// (always into the next month) and backing off by that date's own day of
/// month. `None` in chrono's final representable month, where the step
/// forward overflows.
pub fn month_window(today: NaiveDate) -> Option<MonthWindow> {
    let start = today.checked_sub_days(Days::new(u64::from(today.day0())))?;
    let next_month = start.checked_add_days(Days::new(27 + 4))?;
    let end = next_month.checked_sub_days(Days::new(u64::from(next_month.day())))?;
    Some(MonthWindow { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(date(2024, 2, 15), date(2024, 2, 1), date(2024, 2, 29))]
    #[case(date(2023, 2, 15), date(2023, 2, 1), date(2023, 2, 28))]
    #[case(date(2024, 4, 10), date(2024, 4, 1), date(2024, 4, 30))]
    #[case(date(2024, 1, 31), date(2024, 1, 1), date(2024, 1, 31))]
    #[case(date(2024, 12, 1), date(2024, 12, 1), date(2024, 12, 31))]
    #[case(date(2000, 2, 29), date(2000, 2, 1), date(2000, 2, 29))]
    #[case(date(1900, 2, 3), date(1900, 2, 1), date(1900, 2, 28))]
    fn test_month_window(#[case] today: NaiveDate, #[case] start: NaiveDate, #[case] end: NaiveDate) {
        assert_eq!(month_window(today), Some(MonthWindow { start, end }));
    }

    #[test]
    fn test_every_day_of_leap_and_common_years() {
        for year in [2023, 2024] {
            let mut day = date(year, 1, 1);
            while day.year() == year {
                let window = month_window(day).unwrap();

                let following = if day.month() == 12 {
                    date(year + 1, 1, 1)
                } else {
                    date(year, day.month() + 1, 1)
                };

                assert_eq!(window.start, date(year, day.month(), 1), "start for {day}");
                assert_eq!(window.end, following.pred_opt().unwrap(), "end for {day}");
                assert!(window.contains(day));

                day = day.succ_opt().unwrap();
            }
        }
    }

    #[rstest]
    #[case(NaiveDate::MAX)]
    #[case(NaiveDate::MAX - Days::new(10))]
    fn test_final_representable_month_has_no_window(#[case] today: NaiveDate) {
        assert_eq!(month_window(today), None);
    }

    #[test]
    fn test_extreme_months_short_of_overflow() {
        let penultimate = NaiveDate::MAX - Days::new(u64::from(NaiveDate::MAX.day()));
        let window = month_window(penultimate).unwrap();
        assert_eq!(window.end, penultimate);
        assert_eq!(window.start.day(), 1);

        let first = month_window(NaiveDate::MIN).unwrap();
        assert_eq!(first.start, NaiveDate::MIN);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = month_window(date(2024, 3, 17)).unwrap();

        assert!(window.contains(date(2024, 3, 1)));
        assert!(window.contains(date(2024, 3, 31)));
        assert!(!window.contains(date(2024, 2, 29)));
        assert!(!window.contains(date(2024, 4, 1)));
    }
}
