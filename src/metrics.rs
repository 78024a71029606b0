use std::fmt;

use chrono::{NaiveTime, Timelike};

use crate::models::trip::Trip;

/// Placeholder shown wherever a derived value cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Elapsed time between departure and arrival, as shown in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripDuration {
    Elapsed { minutes: u32 },
    NotAvailable,
}

impl fmt::Display for TripDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripDuration::Elapsed { minutes } => write!(f, "{}h {}m", minutes / 60, minutes % 60),
            TripDuration::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// Kilometres driven. Negative when the odometer readings are inconsistent,
/// `None` without a final reading or when the difference does not fit.
pub fn distance(trip: &Trip) -> Option<i64> {
    trip.final_kilometers
        .and_then(|final_km| final_km.checked_sub(trip.initial_kilometers))
}

pub fn distance_text(trip: &Trip) -> String {
    distance(trip)
        .map(|km| format!("{km} km"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn duration(trip: &Trip) -> TripDuration {
    match trip.arrival_time.as_deref() {
        Some(arrival) => duration_between(&trip.departure_time, arrival),
        None => TripDuration::NotAvailable,
    }
}

/// An arrival earlier than the departure is read as the next day. Trips
/// spanning more than one midnight are not representable.
pub fn duration_between(departure: &str, arrival: &str) -> TripDuration {
    let (Some(dep), Some(arr)) = (minute_of_day(departure), minute_of_day(arrival)) else {
        return TripDuration::NotAvailable;
    };
    let mut elapsed = arr - dep;
    if elapsed < 0 {
        elapsed += MINUTES_PER_DAY;
    }
    match u32::try_from(elapsed) {
        Ok(minutes) => TripDuration::Elapsed { minutes },
        Err(_) => TripDuration::NotAvailable,
    }
}

fn minute_of_day(input: &str) -> Option<i64> {
    let input = input.trim();
    let time = NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .ok()?;
    Some(i64::from(time.hour()) * 60 + i64::from(time.minute()))
}
