use std::{fs, path::Path};

use async_trait::async_trait;
use eyre::{eyre, Context as _, Result};
use log::info;
use model::{
    booking::{PtBookingPayload, PtBookingUpdate, PtSlot, ScheduleUpdate},
    ids::{BookingId, CoachId, CustomerId, DayRange, PackageId, SessionId},
    raw::{RawCoach, RawCoachSession, RawCustomer, RawMemberBooking, RawPackage, RawPtBooking},
    slot::Slot,
    status::BookingStatus,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::backend::{ClassSessionPage, Relations, ScheduleBackend};

/// Everything the in-memory collaborator holds. Also the JSON fixture format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    #[serde(default)]
    pub coaches: Vec<RawCoach>,
    #[serde(default)]
    pub customers: Vec<RawCustomer>,
    #[serde(default)]
    pub packages: Vec<RawPackage>,
    #[serde(default)]
    pub class_sessions: Vec<RawCoachSession>,
    #[serde(default)]
    pub class_bookings: Vec<RawMemberBooking>,
    #[serde(default)]
    pub pt_bookings: Vec<RawPtBooking>,
}

impl Fixture {
    fn coach(&self, id: CoachId) -> RawCoach {
        self.coaches
            .iter()
            .find(|coach| coach.id == Some(id))
            .cloned()
            .unwrap_or(RawCoach {
                id: Some(id),
                ..Default::default()
            })
    }

    fn customer(&self, id: CustomerId) -> RawCustomer {
        self.customers
            .iter()
            .find(|customer| customer.id == Some(id))
            .cloned()
            .unwrap_or(RawCustomer {
                id: Some(id),
                ..Default::default()
            })
    }

    fn package(&self, id: PackageId) -> Option<RawPackage> {
        self.packages
            .iter()
            .find(|package| package.id == Some(id))
            .cloned()
    }

    /// Enrolled count: bookings of the slot, class or PT, that are not
    /// cancelled.
    fn enrolled(&self, session: SessionId) -> u32 {
        let class = self
            .class_bookings
            .iter()
            .filter(|b| b.session_id == session && b.status != BookingStatus::Cancelled)
            .count();
        let pt = self
            .pt_bookings
            .iter()
            .filter(|b| {
                b.class_schedule_session_id == Some(session)
                    && b.status != BookingStatus::Cancelled
            })
            .count();
        (class + pt) as u32
    }

    fn joined_session(&self, id: SessionId) -> Option<RawCoachSession> {
        let mut session = self.class_sessions.iter().find(|s| s.id == id)?.clone();
        session.attendance_count = Some(self.enrolled(id));
        Some(session)
    }

    fn next_pt_id(&self) -> BookingId {
        let max = self.pt_bookings.iter().map(|b| b.id.0).max().unwrap_or(0);
        BookingId(max + 1)
    }
}

fn apply_pt_slot(booking: &mut RawPtBooking, slot: PtSlot) {
    booking.booking_date = Some(slot.booking_date);
    booking.booking_time = Some(slot.booking_time);
    booking.start_time = Some(slot.start_time);
    booking.duration_minutes = Some(slot.duration_minutes);
}

/// Process-local collaborator backed by a [`Fixture`]. Writes are
/// last-write-wins and never validate status transitions.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Fixture>,
}

impl MemoryStore {
    pub fn new(fixture: Fixture) -> Self {
        MemoryStore {
            data: RwLock::new(fixture),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))?;
        info!(
            "Fixture loaded: {} sessions, {} class bookings, {} pt bookings",
            fixture.class_sessions.len(),
            fixture.class_bookings.len(),
            fixture.pt_bookings.len()
        );
        Ok(MemoryStore::new(fixture))
    }

    pub fn snapshot(&self) -> Fixture {
        self.data.read().clone()
    }
}

#[async_trait]
impl ScheduleBackend for MemoryStore {
    async fn fetch_class_sessions(
        &self,
        range: DayRange,
        coach: Option<CoachId>,
        relations: Relations,
    ) -> Result<ClassSessionPage> {
        let data = self.data.read();
        let sessions = data
            .class_sessions
            .iter()
            .filter(|s| s.start_time.map_or(true, |start| range.contains(start)))
            .filter(|s| coach.map_or(true, |coach| s.coach_id() == Some(coach)))
            .filter_map(|s| data.joined_session(s.id))
            .map(|mut s| {
                if !relations.schedule {
                    s.schedule = None;
                } else if !relations.coach {
                    if let Some(schedule) = s.schedule.as_mut() {
                        schedule.coach = None;
                    }
                }
                s
            })
            .collect();
        Ok(ClassSessionPage { data: sessions })
    }

    async fn fetch_class_bookings(&self, range: DayRange) -> Result<Vec<RawMemberBooking>> {
        let data = self.data.read();
        let bookings = data
            .class_bookings
            .iter()
            .map(|booking| {
                let mut booking = booking.clone();
                booking.session = data.joined_session(booking.session_id);
                if let Some(customer_id) = booking.customer_id {
                    if booking.customer.is_none() {
                        booking.customer = Some(data.customer(customer_id));
                    }
                }
                booking
            })
            .filter(|booking| {
                booking
                    .session
                    .as_ref()
                    .and_then(|s| s.start_time)
                    .map_or(true, |start| range.contains(start))
            })
            .collect();
        Ok(bookings)
    }

    async fn fetch_pt_bookings(
        &self,
        range: DayRange,
        coach: Option<CoachId>,
    ) -> Result<Vec<RawPtBooking>> {
        let data = self.data.read();
        let bookings = data
            .pt_bookings
            .iter()
            .filter(|b| coach.map_or(true, |coach| b.coach_id() == Some(coach)))
            .filter(|b| b.slot().map_or(true, |slot| range.contains_day(slot.day_id())))
            .cloned()
            .collect();
        Ok(bookings)
    }

    async fn update_attendance_status(&self, id: BookingId, status: BookingStatus) -> Result<()> {
        info!("Update attendance status: {} -> {}", id, status);
        let mut data = self.data.write();
        let booking = data
            .class_bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| eyre!("Booking not found: {}", id))?;
        booking.status = status;
        Ok(())
    }

    async fn mark_all_attended(&self, session: SessionId) -> Result<u32> {
        info!("Mark all attended: {}", session);
        let mut data = self.data.write();
        if !data.class_sessions.iter().any(|s| s.id == session) {
            return Err(eyre!("Session not found: {}", session));
        }
        let mut changed = 0;
        for booking in data
            .class_bookings
            .iter_mut()
            .filter(|b| b.session_id == session && b.status == BookingStatus::Booked)
        {
            booking.status = BookingStatus::Attended;
            changed += 1;
        }
        Ok(changed)
    }

    async fn create_pt_booking(&self, payload: PtBookingPayload) -> Result<BookingId> {
        let mut data = self.data.write();
        let id = data.next_pt_id();
        info!("Create pt booking {}: {:?}", id, payload.slot);
        let mut booking = RawPtBooking {
            id,
            coach: Some(data.coach(payload.coach_id)),
            customer: Some(data.customer(payload.customer_id)),
            package: payload.package_id.and_then(|p| data.package(p)),
            booking_date: None,
            booking_time: None,
            start_time: None,
            duration_minutes: None,
            status: payload.status,
            class_schedule_session_id: payload.class_schedule_session_id,
            notes: payload.notes,
        };
        apply_pt_slot(&mut booking, payload.slot);
        data.pt_bookings.push(booking);
        Ok(id)
    }

    async fn update_pt_booking(&self, id: BookingId, update: PtBookingUpdate) -> Result<()> {
        info!("Update pt booking {}: {:?}", id, update);
        let mut data = self.data.write();
        let coach = update.coach_id.map(|coach| data.coach(coach));
        let booking = data
            .pt_bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| eyre!("PT booking not found: {}", id))?;
        if let Some(coach) = coach {
            booking.coach = Some(coach);
        }
        if let Some(slot) = update.slot {
            apply_pt_slot(booking, slot);
        }
        if let Some(status) = update.status {
            booking.status = status;
        }
        if let Some(notes) = update.notes {
            booking.notes = Some(notes);
        }
        Ok(())
    }

    async fn cancel_pt_booking(&self, id: BookingId) -> Result<()> {
        info!("Cancel pt booking: {}", id);
        let mut data = self.data.write();
        let booking = data
            .pt_bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| eyre!("PT booking not found: {}", id))?;
        booking.status = BookingStatus::Cancelled;
        Ok(())
    }

    async fn update_class_schedule_session(
        &self,
        id: SessionId,
        update: ScheduleUpdate,
    ) -> Result<()> {
        info!("Update schedule session {}: {:?}", id, update);
        let mut data = self.data.write();
        let slot = Slot::new(update.start_time, update.duration);
        let session = data
            .class_sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| eyre!("Session not found: {}", id))?;
        session.start_time = Some(slot.start_utc());
        session.end_time = Some(slot.end_utc());
        session.duration = Some(slot.duration_min());

        // PT bookings taken on this slot carry their own wall-clock copy.
        for booking in data
            .pt_bookings
            .iter_mut()
            .filter(|b| b.class_schedule_session_id == Some(id))
        {
            apply_pt_slot(booking, PtSlot::from(slot));
        }
        Ok(())
    }
}
