use std::cmp::Ordering;

use serde::{
    de::{value, DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer,
};
use serde_with::{serde_as, NoneAsEmptyString};

use crate::models::trip::Trip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Date,
    VehicleType,
    VehiclePlate,
    DriverName,
    StartLocation,
    Destination,
    DepartureTime,
    ArrivalTime,
    InitialKilometers,
    FinalKilometers,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::VehicleType => "vehicle_type",
            SortKey::VehiclePlate => "vehicle_plate",
            SortKey::DriverName => "driver_name",
            SortKey::StartLocation => "start_location",
            SortKey::Destination => "destination",
            SortKey::DepartureTime => "departure_time",
            SortKey::ArrivalTime => "arrival_time",
            SortKey::InitialKilometers => "initial_kilometers",
            SortKey::FinalKilometers => "final_kilometers",
        }
    }

    /// Comparator table, ascending.
    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        match self {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::VehicleType => a.vehicle_type.as_str().cmp(b.vehicle_type.as_str()),
            SortKey::VehiclePlate => a.vehicle_plate.cmp(&b.vehicle_plate),
            SortKey::DriverName => a.driver_name.cmp(&b.driver_name),
            SortKey::StartLocation => a.start_location.cmp(&b.start_location),
            SortKey::Destination => a.destination.cmp(&b.destination),
            SortKey::DepartureTime => a.departure_time.cmp(&b.departure_time),
            SortKey::ArrivalTime => a.arrival_time.cmp(&b.arrival_time),
            SortKey::InitialKilometers => a.initial_kilometers.cmp(&b.initial_kilometers),
            SortKey::FinalKilometers => a.final_kilometers.cmp(&b.final_kilometers),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortOrder {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// State after the user picks `key`: same key flips, another key
    /// starts ascending.
    pub fn select(self, key: SortKey) -> Self {
        if key == self.key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Self::ascending(key)
        }
    }

    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

pub fn sort_trips(trips: &[Trip], order: SortOrder) -> Vec<&Trip> {
    let mut sorted: Vec<&Trip> = trips.iter().collect();
    sorted.sort_by(|a, b| order.compare(a, b));
    sorted
}

pub fn matches_query(trip: &Trip, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [
        trip.vehicle_plate.as_str(),
        trip.start_location.as_str(),
        trip.destination.as_str(),
        trip.driver_text(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_trips<'a>(trips: Vec<&'a Trip>, query: &str) -> Vec<&'a Trip> {
    trips
        .into_iter()
        .filter(|trip| matches_query(trip, query))
        .collect()
}

/// At most one trip shows its detail panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion(pub Option<String>);

impl Expansion {
    pub fn toggled(&self, id: &str) -> Self {
        match &self.0 {
            Some(current) if current == id => Self(None),
            _ => Self(Some(id.to_string())),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.0.as_deref() == Some(id)
    }
}

/// Display state of the trip table, as carried in the query string.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub sort: Option<SortKey>,
    #[serde(default, deserialize_with = "ignore_unknown")]
    pub dir: Option<SortDirection>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub expanded: Option<String>,
}

/// Stale or hand-edited links fall back to the default order instead of
/// failing the request.
fn ignore_unknown<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let raw: value::StringDeserializer<value::Error> = raw.into_deserializer();
        T::deserialize(raw).ok()
    }))
}

impl ListingQuery {
    pub fn order(&self) -> SortOrder {
        match self.sort {
            Some(key) => SortOrder {
                key,
                direction: self.dir.unwrap_or_default(),
            },
            None => SortOrder::default(),
        }
    }

    pub fn expansion(&self) -> Expansion {
        Expansion(self.expanded.clone())
    }

    /// Sorted, then filtered. The stored collection is never reordered.
    pub fn apply<'a>(&self, trips: &'a [Trip]) -> Vec<&'a Trip> {
        filter_trips(sort_trips(trips, self.order()), &self.q)
    }

    pub fn with_order(&self, order: SortOrder) -> Self {
        Self {
            sort: Some(order.key),
            dir: Some(order.direction),
            ..self.clone()
        }
    }

    pub fn with_expansion(&self, expansion: Expansion) -> Self {
        Self {
            expanded: expansion.0,
            ..self.clone()
        }
    }

    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if !self.q.is_empty() {
            serializer.append_pair("q", &self.q);
        }
        let order = self.order();
        serializer.append_pair("sort", order.key.as_str());
        serializer.append_pair("dir", order.direction.as_str());
        if let Some(expanded) = &self.expanded {
            serializer.append_pair("expanded", expanded);
        }
        serializer.finish()
    }

    pub fn href(&self, path: &str) -> String {
        format!("{path}?{}", self.query_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::trip::VehicleType;

    fn trip(id: &str, date: (i32, u32, u32), plate: &str, start: &str, destination: &str) -> Trip {
        Trip {
            id: id.into(),
            vehicle_type: VehicleType::ServiceType01,
            vehicle_plate: plate.into(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            start_location: start.into(),
            departure_time: "08:00".into(),
            initial_kilometers: 100,
            destination: destination.into(),
            arrival_time: Some("09:00".into()),
            final_kilometers: Some(150),
            stops: Vec::new(),
            driver_name: None,
            activity: None,
            is_substitution: false,
        }
    }

    fn sample() -> Vec<Trip> {
        vec![
            trip("a", (2024, 3, 2), "ABC-1000", "Depot", "Harbor"),
            trip("b", (2023, 12, 24), "QRS-2000", "Harbor", "Airport"),
            trip("c", (2024, 7, 19), "xyz-3000", "Airport", "abc Center"),
            trip("d", (2024, 1, 5), "LMN-4000", "Depot", "Farm"),
        ]
    }

    fn ids(trips: &[&Trip]) -> Vec<String> {
        trips.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn date_sort_descending_reverses_ascending() {
        let trips = sample();
        let asc = sort_trips(&trips, SortOrder::ascending(SortKey::Date));
        let desc = sort_trips(&trips, SortOrder::ascending(SortKey::Date).select(SortKey::Date));
        assert_eq!(ids(&asc), vec!["b", "d", "a", "c"]);
        let mut reversed = ids(&desc);
        reversed.reverse();
        assert_eq!(ids(&asc), reversed);
    }

    #[test]
    fn selecting_a_new_key_resets_to_ascending() {
        let order = SortOrder::default();
        assert_eq!(order.direction, SortDirection::Desc);
        let order = order.select(SortKey::VehiclePlate);
        assert_eq!(order, SortOrder::ascending(SortKey::VehiclePlate));
        let order = order.select(SortKey::VehiclePlate);
        assert_eq!(order.direction, SortDirection::Desc);
    }

    #[test]
    fn absent_values_sort_first() {
        let mut trips = sample();
        trips[2].final_kilometers = None;
        let sorted = sort_trips(&trips, SortOrder::ascending(SortKey::FinalKilometers));
        assert_eq!(sorted[0].id, "c");
    }

    #[test]
    fn sorting_leaves_source_order_alone() {
        let trips = sample();
        let _ = sort_trips(&trips, SortOrder::default());
        assert_eq!(trips[0].id, "a");
    }

    #[test]
    fn filter_is_case_insensitive_over_text_fields() {
        let mut trips = sample();
        trips[3].driver_name = Some("Fabcio".into());
        let all: Vec<&Trip> = trips.iter().collect();
        let found = filter_trips(all, "ABC");
        assert_eq!(ids(&found), vec!["a", "c", "d"]);
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let trips = sample();
        let all: Vec<&Trip> = trips.iter().collect();
        assert_eq!(ids(&filter_trips(all, "")), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn expansion_toggles_single_panel() {
        let none = Expansion::default();
        let a = none.toggled("a");
        assert!(a.is_expanded("a"));
        let b = a.toggled("b");
        assert!(b.is_expanded("b") && !b.is_expanded("a"));
        assert_eq!(b.toggled("b"), Expansion(None));
    }

    #[test]
    fn listing_query_defaults_and_links() {
        let query = ListingQuery::default();
        assert_eq!(query.order(), SortOrder::default());

        let query = ListingQuery {
            q: "são paulo".into(),
            ..ListingQuery::default()
        };
        let next = query.with_order(query.order().select(SortKey::Date));
        assert_eq!(
            next.href("/trips"),
            "/trips?q=s%C3%A3o+paulo&sort=date&dir=asc"
        );
    }

    #[test]
    fn unknown_sort_values_fall_back_to_default_order() {
        let query: ListingQuery = serde_json::from_str(
            r#"{"q": "x", "sort": "mileage", "dir": "sideways"}"#,
        )
        .unwrap();
        assert_eq!(query.sort, None);
        assert_eq!(query.dir, None);
        assert_eq!(query.order(), SortOrder::default());

        let query: ListingQuery =
            serde_json::from_str(r#"{"sort": "driver_name", "dir": ""}"#).unwrap();
        assert_eq!(query.sort, Some(SortKey::DriverName));
        assert_eq!(query.order(), SortOrder::ascending(SortKey::DriverName));
    }

    #[test]
    fn apply_sorts_then_filters() {
        let trips = sample();
        let query = ListingQuery {
            q: "depot".into(),
            sort: Some(SortKey::Date),
            dir: Some(SortDirection::Asc),
            expanded: None,
        };
        assert_eq!(ids(&query.apply(&trips)), vec!["d", "a"]);
    }
}
