//! Recurring weekday-rule evaluation: decides whether a date is a working
//! day from the base booleans, the per-weekday rule table, and the Saturday
//! fallback rule. Pure, no hidden state.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{AttendanceConfig, WeekdayRule};

/// 1-based count of how many times this date's weekday has occurred in its
/// month up to and including the date (first Saturday, second Saturday, ...).
pub fn occurrence_index(date: NaiveDate) -> u32 {
    let first_of_month = date.with_day(1).expect("day 1 exists in every month");
    let offset = (date.weekday().num_days_from_monday() + 7
        - first_of_month.weekday().num_days_from_monday())
        % 7;
    let first_occurrence = 1 + offset;
    (date.day() - first_occurrence) / 7 + 1
}

/// The rule in effect for `date`: the explicit table entry if present, the
/// Saturday fallback for Saturdays without one, else `all`/`none` from the
/// base working-day boolean.
pub fn rule_for(config: &AttendanceConfig, date: NaiveDate) -> WeekdayRule {
    let weekday = date.weekday();
    if let Some(rule) = config.weekday_rules.get(weekday) {
        return rule;
    }
    if weekday == Weekday::Sat {
        return config.saturday_rule;
    }
    if config.working_days.get(weekday) {
        WeekdayRule::All
    } else {
        WeekdayRule::None
    }
}

/// Whether `date` is a working day under `config`, ignoring holidays and
/// recorded attendance.
pub fn is_working_day(config: &AttendanceConfig, date: NaiveDate) -> bool {
    match rule_for(config, date) {
        WeekdayRule::None => false,
        WeekdayRule::All => config.working_days.get(date.weekday()),
        WeekdayRule::Odd => occurrence_index(date) % 2 == 1,
        WeekdayRule::Even => occurrence_index(date) % 2 == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn occurrence_index_counts_within_month() {
        // November 2025 starts on a Saturday.
        assert_eq!(occurrence_index(date(2025, 11, 1)), 1);
        assert_eq!(occurrence_index(date(2025, 11, 8)), 2);
        assert_eq!(occurrence_index(date(2025, 11, 15)), 3);
        assert_eq!(occurrence_index(date(2025, 11, 22)), 4);
        assert_eq!(occurrence_index(date(2025, 11, 29)), 5);
        // Mondays of the same month.
        assert_eq!(occurrence_index(date(2025, 11, 3)), 1);
        assert_eq!(occurrence_index(date(2025, 11, 24)), 4);
    }

    #[test]
    fn odd_saturdays_work_when_first_is_saturday() {
        let mut config = AttendanceConfig::new(1);
        config.saturday_rule = WeekdayRule::Odd;

        for day in [1, 15, 29] {
            assert!(is_working_day(&config, date(2025, 11, day)), "day {day}");
        }
        for day in [8, 22] {
            assert!(!is_working_day(&config, date(2025, 11, day)), "day {day}");
        }
    }

    #[test]
    fn even_rule_is_the_complement() {
        let mut config = AttendanceConfig::new(1);
        config.saturday_rule = WeekdayRule::Even;

        assert!(!is_working_day(&config, date(2025, 11, 1)));
        assert!(is_working_day(&config, date(2025, 11, 8)));
        assert!(is_working_day(&config, date(2025, 11, 22)));
    }

    #[test]
    fn all_rule_respects_base_booleans() {
        let config = AttendanceConfig::new(1);
        // Default Mon-Fri working, weekend off.
        assert!(is_working_day(&config, date(2025, 11, 3))); // Monday
        assert!(is_working_day(&config, date(2025, 11, 7))); // Friday
        assert!(!is_working_day(&config, date(2025, 11, 2))); // Sunday
        assert!(!is_working_day(&config, date(2025, 11, 1))); // Saturday, rule none
    }

    #[test]
    fn explicit_rule_beats_saturday_fallback() {
        let mut config = AttendanceConfig::new(1);
        config.saturday_rule = WeekdayRule::Odd;
        config.weekday_rules.saturday = Some(WeekdayRule::None);

        assert!(!is_working_day(&config, date(2025, 11, 1)));
    }

    #[test]
    fn odd_rule_on_a_regular_weekday() {
        let mut config = AttendanceConfig::new(1);
        config.weekday_rules.wednesday = Some(WeekdayRule::Odd);

        // Wednesdays in November 2025: 5, 12, 19, 26.
        assert!(is_working_day(&config, date(2025, 11, 5)));
        assert!(!is_working_day(&config, date(2025, 11, 12)));
        assert!(is_working_day(&config, date(2025, 11, 19)));
        assert!(!is_working_day(&config, date(2025, 11, 26)));
    }
}
