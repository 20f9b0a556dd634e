use std::collections::{BTreeMap, BTreeSet};

use strum::IntoEnumIterator as _;

use crate::{ids::CoachId, rights::Viewer, session::SessionType};

/// Calendar filters of one mounted view. Not persisted; there is no reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    type_filters: BTreeSet<SessionType>,
    coach_filters: BTreeMap<CoachId, bool>,
    locked_coach: Option<CoachId>,
    search_query: String,
}

impl FilterState {
    /// All session types enabled. Every known coach is enabled, unless the
    /// viewer is scoped to a single coach, in which case the coach filter is
    /// locked to that coach.
    pub fn new(viewer: &Viewer, coaches: impl IntoIterator<Item = CoachId>) -> Self {
        let locked_coach = viewer.scoped_coach();
        let coach_filters = match locked_coach {
            Some(coach) => BTreeMap::from([(coach, true)]),
            None => coaches.into_iter().map(|coach| (coach, true)).collect(),
        };
        FilterState {
            type_filters: SessionType::iter().collect(),
            coach_filters,
            locked_coach,
            search_query: String::new(),
        }
    }

    pub fn is_type_enabled(&self, session_type: SessionType) -> bool {
        self.type_filters.contains(&session_type)
    }

    pub fn set_type(&mut self, session_type: SessionType, enabled: bool) {
        if enabled {
            self.type_filters.insert(session_type);
        } else {
            self.type_filters.remove(&session_type);
        }
    }

    pub fn toggle_type(&mut self, session_type: SessionType) {
        let enabled = self.is_type_enabled(session_type);
        self.set_type(session_type, !enabled);
    }

    pub fn enabled_types(&self) -> impl Iterator<Item = SessionType> + '_ {
        self.type_filters.iter().copied()
    }

    /// Coaches missing from the filter map (e.g. hired after the view was
    /// mounted) count as enabled.
    pub fn is_coach_enabled(&self, coach: CoachId) -> bool {
        match self.locked_coach {
            Some(locked) => locked == coach,
            None => self.coach_filters.get(&coach).copied().unwrap_or(true),
        }
    }

    pub fn toggle_coach(&mut self, coach: CoachId) {
        if self.locked_coach.is_some() {
            return;
        }
        let enabled = self.is_coach_enabled(coach);
        self.coach_filters.insert(coach, !enabled);
    }

    pub fn coach_filters(&self) -> &BTreeMap<CoachId, bool> {
        &self.coach_filters
    }

    pub fn is_coach_locked(&self) -> bool {
        self.locked_coach.is_some()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }
}
