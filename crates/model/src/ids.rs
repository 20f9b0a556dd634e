use std::fmt;

use chrono::{
    DateTime, Datelike as _, Duration, Local, NaiveDate, NaiveTime, TimeZone as _, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                $name(id)
            }
        }
    };
}

record_id!(CoachId);
record_id!(CustomerId);
record_id!(SessionId);
record_id!(BookingId);
record_id!(PackageId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekId(NaiveDate);

impl WeekId {
    pub fn new(date_time: DateTime<Local>) -> Self {
        WeekId(date_time.date_naive().week(Weekday::Mon).first_day())
    }

    pub fn first_day(&self) -> DayId {
        DayId(self.0)
    }

    pub fn next(&self) -> Self {
        WeekId(self.0 + Duration::days(7))
    }

    pub fn prev(&self) -> Self {
        WeekId(self.0 - Duration::days(7))
    }

    pub fn range(&self) -> DayRange {
        DayRange::new(self.first_day(), self.next().first_day())
    }
}

impl Default for WeekId {
    fn default() -> Self {
        WeekId::new(Local::now())
    }
}

impl From<DateTime<Local>> for WeekId {
    fn from(date_time: DateTime<Local>) -> Self {
        WeekId::new(date_time)
    }
}

/// Local calendar day. All "today" comparisons go through this key so that
/// time-of-day never leaks into date arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DayId(NaiveDate);

impl DayId {
    pub fn new(date_time: DateTime<Local>) -> Self {
        DayId(date_time.date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        DayId(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Local midnight of this day. `None` only when midnight does not exist
    /// in the local zone.
    pub fn local(&self) -> Option<DateTime<Local>> {
        Local
            .from_local_datetime(&self.0.and_time(NaiveTime::MIN))
            .earliest()
    }

    pub fn week_day(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn next(&self) -> Self {
        DayId(self.0 + Duration::days(1))
    }
}

impl From<DateTime<Local>> for DayId {
    fn from(date_time: DateTime<Local>) -> Self {
        DayId::new(date_time)
    }
}

impl From<DateTime<Utc>> for DayId {
    fn from(date_time: DateTime<Utc>) -> Self {
        DayId::from(date_time.with_timezone(&Local))
    }
}

impl Default for DayId {
    fn default() -> Self {
        DayId::new(Local::now())
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d.%m.%Y"))
    }
}

/// Half-open range of local days: `from` inclusive, `to` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayRange {
    pub from: DayId,
    pub to: DayId,
}

impl DayRange {
    pub fn new(from: DayId, to: DayId) -> Self {
        DayRange { from, to }
    }

    pub fn days(from: DayId, count: u32) -> Self {
        let to = DayId(from.0 + Duration::days(count as i64));
        DayRange { from, to }
    }

    pub fn contains_day(&self, day: DayId) -> bool {
        day >= self.from && day < self.to
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.contains_day(DayId::from(instant))
    }
}
