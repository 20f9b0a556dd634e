use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use log::{info, warn};
use model::{
    filter::FilterState,
    ids::{CoachId, DayRange, WeekId},
    rights::Viewer,
};

use crate::service::bookings::MutationError;

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identity of one mounted view. Results addressed to an older token are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewToken(u64);

impl ViewToken {
    pub fn next() -> Self {
        ViewToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ViewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transient failure message shown on the mounted view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification(pub String);

/// Result of an async mutation, addressed to the view that started it.
#[derive(Debug)]
pub struct Outcome<T> {
    pub token: ViewToken,
    pub result: Result<T, MutationError>,
}

impl<T> Outcome<T> {
    pub fn new(token: ViewToken, result: Result<T, MutationError>) -> Self {
        Outcome { token, result }
    }
}

pub struct CalendarView {
    token: ViewToken,
    viewer: Viewer,
    filter: FilterState,
    week: WeekId,
    days: u32,
    notifications: Vec<Notification>,
}

impl CalendarView {
    pub fn mount(
        viewer: Viewer,
        week: WeekId,
        days: u32,
        coaches: impl IntoIterator<Item = CoachId>,
    ) -> Self {
        let filter = FilterState::new(&viewer, coaches);
        let token = ViewToken::next();
        info!("Mounted calendar view {} for week {:?}", token, week);
        CalendarView {
            token,
            viewer,
            filter,
            week,
            days: days.max(1),
            notifications: Vec::new(),
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn week(&self) -> WeekId {
        self.week
    }

    pub fn range(&self) -> DayRange {
        DayRange::days(self.week.first_day(), self.days)
    }

    /// Navigation remounts: pending results of the old week are dropped.
    /// Filters survive.
    pub fn show_week(&mut self, week: WeekId) {
        self.week = week;
        self.token = ViewToken::next();
        self.notifications.clear();
    }

    pub fn next_week(&mut self) {
        self.show_week(self.week.next());
    }

    pub fn prev_week(&mut self) {
        self.show_week(self.week.prev());
    }

    /// Delivers a mutation result. Failures become a notification; results
    /// for another mount are dropped.
    pub fn apply<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        if outcome.token != self.token {
            warn!(
                "Dropping result for view {}, mounted is {}",
                outcome.token, self.token
            );
            return None;
        }
        match outcome.result {
            Ok(value) => Some(value),
            Err(err) => {
                self.notifications.push(Notification(err.to_string()));
                None
            }
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
