//! Calendar months as used by the ledger.
//!
//! Month names are Brazilian Portuguese, lower case, matching what the
//! persistence layer stores (`"outubro"`), and labels read `"outubro 2026"`.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use super::validation::LedgerValidationError;

const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const ENGLISH_MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A calendar month of a given year.
///
/// The month is always 1-12; deserialization goes through [`MonthYear::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawMonthYear")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

/// Wire shape of [`MonthYear`] before the range check.
#[derive(Deserialize)]
struct RawMonthYear {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthYear> for MonthYear {
    type Error = LedgerValidationError;

    fn try_from(raw: RawMonthYear) -> Result<Self, Self::Error> {
        Self::new(raw.month, raw.year)
    }
}

impl MonthYear {
    /// Creates a period from a 1-based month number.
    ///
    /// # Errors
    ///
    /// Returns `LedgerValidationError::InvalidMonth` unless `month` is 1-12.
    pub fn new(month: u32, year: i32) -> Result<Self, LedgerValidationError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(LedgerValidationError::InvalidMonth(month))
        }
    }

    /// The month containing `instant`, in the instant's own time zone.
    #[must_use]
    pub fn containing<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    /// Parses a month name (Portuguese or English, any case).
    #[must_use]
    pub fn from_name(name: &str, year: i32) -> Option<Self> {
        let name = name.trim().to_lowercase();
        MONTH_NAMES
            .iter()
            .position(|m| *m == name)
            .or_else(|| ENGLISH_MONTH_NAMES.iter().position(|m| *m == name))
            .and_then(|index| u32::try_from(index + 1).ok())
            .map(|month| Self { year, month })
    }

    /// 1-based month number.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Portuguese month name, lower case.
    #[must_use]
    pub fn month_name(self) -> &'static str {
        self.month
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| MONTH_NAMES.get(index))
            .copied()
            .unwrap_or_default()
    }

    /// `"<month name> <year>"`, the label attached to change metadata.
    #[must_use]
    pub fn label(self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    /// The following month, rolling over into January.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for MonthYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}
