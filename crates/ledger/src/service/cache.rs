use std::future::Future;

use eyre::Result;
use log::debug;
use model::{
    ids::{BookingId, CoachId, DayRange, SessionId},
    raw::{RawCoachSession, RawMemberBooking, RawPtBooking},
    status::BookingStatus,
};
use parking_lot::Mutex;
use storage::backend::{Relations, ScheduleBackend};
use strum::{Display, EnumIter, IntoEnumIterator as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Collection {
    ClassSchedule,
    ClassBookings,
    PtBookings,
}

/// What a cached collection was fetched for. A read with a different key
/// refetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub range: DayRange,
    pub coach: Option<CoachId>,
}

impl FetchKey {
    pub fn new(range: DayRange, coach: Option<CoachId>) -> Self {
        FetchKey { range, coach }
    }
}

struct Entry<T> {
    key: FetchKey,
    data: Vec<T>,
    stale: bool,
}

struct Cached<T> {
    entry: Option<Entry<T>>,
    generation: u64,
}

impl<T: Clone> Cached<T> {
    fn empty() -> Self {
        Cached {
            entry: None,
            generation: 0,
        }
    }

    fn fresh(&self, key: FetchKey) -> Option<&[T]> {
        self.entry
            .as_ref()
            .filter(|entry| !entry.stale && entry.key == key)
            .map(|entry| entry.data.as_slice())
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(entry) = self.entry.as_mut() {
            entry.stale = true;
        }
    }

    /// A fetch that raced an invalidation is kept but stays stale. It never
    /// replaces records written through after the mutation.
    fn store(&mut self, key: FetchKey, data: Vec<T>, generation: u64) {
        if generation != self.generation && self.entry.is_some() {
            return;
        }
        self.entry = Some(Entry {
            key,
            data,
            stale: generation != self.generation,
        });
    }

    fn update(&mut self, pred: impl Fn(&T) -> bool, apply: impl Fn(&mut T)) -> usize {
        let Some(entry) = self.entry.as_mut() else {
            return 0;
        };
        let mut updated = 0;
        for item in entry.data.iter_mut() {
            if pred(item) {
                apply(item);
                updated += 1;
            }
        }
        updated
    }

    fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.entry
            .as_ref()
            .and_then(|entry| entry.data.iter().find(|item| pred(item)).cloned())
    }
}

async fn read<T, F, Fut>(
    cell: &Mutex<Cached<T>>,
    collection: Collection,
    key: FetchKey,
    fetch: F,
) -> Result<Vec<T>>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let generation = {
        let cached = cell.lock();
        if let Some(data) = cached.fresh(key) {
            return Ok(data.to_vec());
        }
        cached.generation
    };
    debug!("Refetching {} for {:?}", collection, key);
    let data = fetch().await?;
    cell.lock().store(key, data.clone(), generation);
    Ok(data)
}

/// Last fetched records per collection. Mutations mark collections stale;
/// the next read refetches them.
pub struct SessionCache {
    class_sessions: Mutex<Cached<RawCoachSession>>,
    class_bookings: Mutex<Cached<RawMemberBooking>>,
    pt_bookings: Mutex<Cached<RawPtBooking>>,
}

impl Default for SessionCache {
    fn default() -> Self {
        SessionCache::new()
    }
}

impl SessionCache {
    pub fn new() -> Self {
        SessionCache {
            class_sessions: Mutex::new(Cached::empty()),
            class_bookings: Mutex::new(Cached::empty()),
            pt_bookings: Mutex::new(Cached::empty()),
        }
    }

    pub fn invalidate(&self, collection: Collection) {
        debug!("Invalidating {}", collection);
        match collection {
            Collection::ClassSchedule => self.class_sessions.lock().invalidate(),
            Collection::ClassBookings => self.class_bookings.lock().invalidate(),
            Collection::PtBookings => self.pt_bookings.lock().invalidate(),
        }
    }

    pub fn invalidate_all(&self) {
        for collection in Collection::iter() {
            self.invalidate(collection);
        }
    }

    pub fn is_fresh(&self, collection: Collection, key: FetchKey) -> bool {
        match collection {
            Collection::ClassSchedule => self.class_sessions.lock().fresh(key).is_some(),
            Collection::ClassBookings => self.class_bookings.lock().fresh(key).is_some(),
            Collection::PtBookings => self.pt_bookings.lock().fresh(key).is_some(),
        }
    }

    pub async fn class_sessions(
        &self,
        backend: &dyn ScheduleBackend,
        key: FetchKey,
    ) -> Result<Vec<RawCoachSession>> {
        read(&self.class_sessions, Collection::ClassSchedule, key, || async move {
            backend
                .fetch_class_sessions(key.range, key.coach, Relations::all())
                .await
                .map(|page| page.data)
        })
        .await
    }

    /// Class bookings are never coach scoped; trainers see them through the
    /// hard filter in aggregation.
    pub async fn class_bookings(
        &self,
        backend: &dyn ScheduleBackend,
        range: DayRange,
    ) -> Result<Vec<RawMemberBooking>> {
        let key = FetchKey::new(range, None);
        read(&self.class_bookings, Collection::ClassBookings, key, || {
            backend.fetch_class_bookings(range)
        })
        .await
    }

    pub async fn pt_bookings(
        &self,
        backend: &dyn ScheduleBackend,
        key: FetchKey,
    ) -> Result<Vec<RawPtBooking>> {
        read(&self.pt_bookings, Collection::PtBookings, key, || {
            backend.fetch_pt_bookings(key.range, key.coach)
        })
        .await
    }

    /// Writes a committed status into the cached record, so checks made
    /// before the next refetch see it.
    pub fn record_class_status(&self, id: BookingId, status: BookingStatus) {
        self.class_bookings
            .lock()
            .update(|booking| booking.id == id, |booking| booking.status = status);
    }

    pub fn record_pt_status(&self, id: BookingId, status: BookingStatus) {
        self.pt_bookings
            .lock()
            .update(|booking| booking.id == id, |booking| booking.status = status);
    }

    /// Every cached `BOOKED` booking of the session becomes `ATTENDED`.
    pub fn record_session_attended(&self, session: SessionId) -> usize {
        self.class_bookings.lock().update(
            |booking| booking.session_id == session && booking.status == BookingStatus::Booked,
            |booking| booking.status = BookingStatus::Attended,
        )
    }

    pub fn class_session(&self, id: SessionId) -> Option<RawCoachSession> {
        self.class_sessions.lock().find(|session| session.id == id)
    }

    pub fn class_booking(&self, id: BookingId) -> Option<RawMemberBooking> {
        self.class_bookings.lock().find(|booking| booking.id == id)
    }

    pub fn pt_booking(&self, id: BookingId) -> Option<RawPtBooking> {
        self.pt_bookings.lock().find(|booking| booking.id == id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use model::{ids::DayId, raw::RawClassSchedule};
    use storage::memory::{Fixture, MemoryStore};

    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(Fixture {
            class_sessions: vec![RawCoachSession {
                id: SessionId(1),
                start_time: Some(Utc::now() + Duration::days(1)),
                end_time: None,
                duration: Some(60),
                schedule: Some(RawClassSchedule::default()),
                attendance_count: None,
                notes: None,
            }],
            ..Default::default()
        })
    }

    fn key() -> FetchKey {
        FetchKey::new(DayRange::days(DayId::default(), 7), None)
    }

    #[tokio::test]
    async fn test_read_caches_until_invalidated() {
        let store = store();
        let cache = SessionCache::new();
        assert!(!cache.is_fresh(Collection::ClassSchedule, key()));

        let sessions = cache.class_sessions(&store, key()).await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(cache.is_fresh(Collection::ClassSchedule, key()));
        assert!(cache.class_session(SessionId(1)).is_some());

        cache.invalidate(Collection::ClassSchedule);
        assert!(!cache.is_fresh(Collection::ClassSchedule, key()));
        // Stale records are still the last fetched ones.
        assert!(cache.class_session(SessionId(1)).is_some());

        cache.class_sessions(&store, key()).await.unwrap();
        assert!(cache.is_fresh(Collection::ClassSchedule, key()));
    }

    #[tokio::test]
    async fn test_other_range_refetches() {
        let store = store();
        let cache = SessionCache::new();
        cache.class_sessions(&store, key()).await.unwrap();

        let next_week = FetchKey::new(DayRange::days(DayId::default().next(), 7), None);
        assert!(!cache.is_fresh(Collection::ClassSchedule, next_week));
        let scoped = FetchKey::new(key().range, Some(CoachId(7)));
        assert!(!cache.is_fresh(Collection::ClassSchedule, scoped));
    }

    #[test]
    fn test_fetch_racing_invalidation_stays_stale() {
        let mut cached = Cached::<u32>::empty();
        let generation = cached.generation;
        cached.invalidate();
        cached.store(key(), vec![1], generation);
        assert!(cached.fresh(key()).is_none());

        let generation = cached.generation;
        cached.store(key(), vec![1], generation);
        assert_eq!(cached.fresh(key()), Some(&[1][..]));
    }

    #[test]
    fn test_raced_fetch_keeps_written_through_records() {
        let mut cached = Cached::<u32>::empty();
        cached.store(key(), vec![1, 2], cached.generation);
        let generation = cached.generation;

        assert_eq!(cached.update(|item| *item == 1, |item| *item = 5), 1);
        cached.invalidate();
        cached.store(key(), vec![1, 2], generation);
        assert_eq!(cached.find(|item| *item == 5), Some(5));
        assert_eq!(cached.find(|item| *item == 1), None);
    }

    #[test]
    fn test_invalidate_all() {
        let cache = SessionCache::new();
        cache.invalidate_all();
        for collection in Collection::iter() {
            assert!(!cache.is_fresh(collection, key()));
        }
    }
}
