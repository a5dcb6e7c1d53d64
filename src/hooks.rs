//! Extension points for the two server lookups the page is meant to make.
//!
//! Neither lookup has a backend yet. [`PlaceholderBackend`] logs the request
//! and answers `None`, which callers treat as "no answer available".

use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlotQuery {
    pub doctor_id: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub trait UsernameDirectory {
    fn check_username(&self, query: &UsernameQuery) -> Option<Availability>;
}

/// Returns the open slots for a doctor on a date, ordered by start time.
pub trait SlotProvider {
    fn available_slots(&self, query: &TimeSlotQuery) -> Option<Vec<TimeSlot>>;
}

impl<F> UsernameDirectory for F
where
    F: Fn(&UsernameQuery) -> Option<Availability>,
{
    fn check_username(&self, query: &UsernameQuery) -> Option<Availability> {
        self(query)
    }
}

impl<F> SlotProvider for F
where
    F: Fn(&TimeSlotQuery) -> Option<Vec<TimeSlot>>,
{
    fn available_slots(&self, query: &TimeSlotQuery) -> Option<Vec<TimeSlot>> {
        self(query)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

impl UsernameDirectory for PlaceholderBackend {
    fn check_username(&self, query: &UsernameQuery) -> Option<Availability> {
        log::info!("checking username: {}", query.username);
        None
    }
}

impl SlotProvider for PlaceholderBackend {
    fn available_slots(&self, query: &TimeSlotQuery) -> Option<Vec<TimeSlot>> {
        log::info!(
            "loading time slots for doctor: {} on {}",
            query.doctor_id,
            query.date
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_backend_answers_nothing() {
        let backend = PlaceholderBackend;
        let username = UsernameQuery {
            username: "jane_doe".into(),
        };
        assert_eq!(backend.check_username(&username), None);

        let slots = TimeSlotQuery {
            doctor_id: 7,
            date: NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"),
        };
        assert_eq!(backend.available_slots(&slots), None);
    }
}
