use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// How a holiday recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "recurrence", rename_all = "lowercase")]
pub enum HolidayRecurrence {
    /// One-off holiday on an exact date.
    None { date: NaiveDate },
    /// Recurs on the same (month, day) every year.
    Yearly { month: u32, day: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub recurrence: HolidayRecurrence,
    pub active: bool,
}

impl Holiday {
    pub fn fixed(id: u64, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            recurrence: HolidayRecurrence::None { date },
            active: true,
        }
    }

    pub fn yearly(id: u64, name: impl Into<String>, month: u32, day: u32) -> Self {
        Self {
            id,
            name: name.into(),
            recurrence: HolidayRecurrence::Yearly { month, day },
            active: true,
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        match self.recurrence {
            HolidayRecurrence::None { date: d } => d == date,
            HolidayRecurrence::Yearly { month, day } => date.month() == month && date.day() == day,
        }
    }
}
