//! Building blocks for the list, search, filter and sort queries.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{EngineError, ResultEngine, util::fold_case};

/// Maximum rows returned by a keyword search.
pub const SEARCH_LIMIT: u64 = 20;
/// Maximum rows returned by list, filter and sort.
pub const LIST_LIMIT: u64 = 50;

/// A calendar month, parsed from `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::InvalidRequest(format!(
                "invalid month: {year:04}-{month:02}"
            )));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

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

    /// Half-open UTC range `[first day 00:00, first day of next month 00:00)`
    /// with both bounds taken in `tz`.
    ///
    /// Every instant of the last day of the month falls inside the range.
    pub fn range(self, tz: Tz) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((self.start(tz)?, self.next().start(tz)?))
    }

    fn start(self, tz: Tz) -> ResultEngine<DateTime<Utc>> {
        let midnight = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| EngineError::InvalidRequest(format!("invalid month: {self}")))?;
        // `earliest` also covers zones whose midnight is skipped by DST.
        tz.from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| EngineError::InvalidRequest(format!("invalid month: {self}")))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidRequest(format!("month must be YYYY-MM, got `{s}`"));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if month.is_empty() || month.len() > 2 || !month.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// Ordering requested by the sort endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Largest amount first.
    Amount,
    /// Newest first.
    #[default]
    Date,
    /// Alphabetical.
    Name,
    /// Alphabetical by category label.
    Category,
}

impl SortKey {
    /// Parses a sort key. Unknown or missing keys fall back to
    /// [`SortKey::Date`] instead of failing.
    #[must_use]
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("amount") => Self::Amount,
            Some("name") => Self::Name,
            Some("category") => Self::Category,
            _ => Self::Date,
        }
    }
}

/// Case-folds the keyword and escapes `LIKE` wildcards so it is matched
/// literally against the folded columns.
pub(crate) fn like_contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in fold_case(keyword).chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
