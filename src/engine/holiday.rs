//! Holiday resolution: projects fixed and yearly-recurring holiday records
//! onto concrete dates.

use chrono::NaiveDate;

use crate::model::Holiday;

/// Resolved holiday set for an organization. Inactive records are dropped at
/// construction; when two holidays land on the same date the first match
/// wins (ties are a configuration error, not a runtime fault).
#[derive(Debug, Clone)]
pub struct HolidayRegistry {
    holidays: Vec<Holiday>,
}

impl HolidayRegistry {
    pub fn new(mut holidays: Vec<Holiday>) -> Self {
        holidays.retain(|h| h.active);
        Self { holidays }
    }

    /// The holiday falling on `date`, if any.
    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.matches(date))
    }

    /// One entry per holiday date within `[start, end]`, in date order.
    /// Yearly holidays resolve once for every year the range spans.
    pub fn resolve_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, &Holiday)> {
        let mut out = Vec::new();
        let mut date = start;
        while date <= end {
            if let Some(holiday) = self.holiday_on(date) {
                out.push((date, holiday));
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
        out
    }
}
