use std::fmt::Debug;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone as _, Utc};

use crate::ids::DayId;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    start_at: DateTime<Utc>,
    duration_min: u32,
}

impl Slot {
    pub fn new(start_at: DateTime<Utc>, duration_min: u32) -> Slot {
        Slot {
            start_at,
            duration_min,
        }
    }

    /// Builds a slot from a local wall-clock date and time, as PT bookings
    /// store them. Returns `None` for times skipped by a DST transition.
    pub fn from_local(date: NaiveDate, time: NaiveTime, duration_min: u32) -> Option<Slot> {
        let start_at = Local.from_local_datetime(&date.and_time(time)).earliest()?;
        Some(Slot::new(start_at.with_timezone(&Utc), duration_min))
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.start_at + Duration::minutes(self.duration_min as i64)
    }

    pub fn start_at(&self) -> DateTime<Local> {
        self.start_at.with_timezone(&Local)
    }

    pub fn end_at(&self) -> DateTime<Local> {
        self.end_utc().with_timezone(&Local)
    }

    pub fn duration_min(&self) -> u32 {
        self.duration_min
    }

    pub fn day_id(&self) -> DayId {
        DayId::from(self.start_at())
    }

    pub fn local_date(&self) -> NaiveDate {
        self.start_at().date_naive()
    }

    pub fn local_time(&self) -> NaiveTime {
        self.start_at().time()
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start_at = self.start_at();
        let fmt = "%H:%M";
        write!(
            f,
            "[({}):{}<->{}]",
            start_at.format("%d.%m"),
            start_at.format(fmt),
            self.end_at().format(fmt)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn test_slot_end_is_start_plus_duration() {
        let start_at = Utc
            .with_ymd_and_hms(2023, 10, 1, 12, 0, 0)
            .single()
            .unwrap();
        let slot = Slot::new(start_at, 45);

        assert_eq!(slot.start_utc(), start_at);
        assert_eq!(
            slot.end_utc(),
            Utc.with_ymd_and_hms(2023, 10, 1, 12, 45, 0)
                .single()
                .unwrap()
        );
        assert_eq!(slot.duration_min(), 45);
    }

    #[test]
    fn test_slot_overlapping_midnight() {
        let start_at = Local
            .with_ymd_and_hms(2023, 10, 1, 23, 30, 0)
            .single()
            .unwrap();
        let slot = Slot::new(start_at.with_timezone(&Utc), 60);

        assert_eq!(slot.day_id(), DayId::from(start_at));
        assert_eq!(slot.end_at().date_naive(), start_at.date_naive().succ_opt().unwrap());
    }

    #[test]
    fn test_from_local_keeps_wall_clock() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let time = NaiveTime::from_hms_opt(9, 30, 0).unwrap();
        let slot = Slot::from_local(date, time, 60).unwrap();

        assert_eq!(slot.local_date(), date);
        assert_eq!(slot.local_time(), time);
        assert_eq!(
            slot.end_at().time(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
    }
}
