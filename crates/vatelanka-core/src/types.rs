//! Typed domain model for the VateLanka client engine.
//!
//! Store documents are duck-typed JSON; everything here is the typed shape
//! they are parsed into at the store boundary, so the projection, proximity,
//! and reminder logic never touches raw records.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issue type for every ticket the client currently creates.
pub const MISSED_COLLECTION: &str = "Missed Collection";

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid waste type: {0}")]
    InvalidWasteType(String),
    #[error("invalid day: {0}")]
    InvalidDay(String),
    #[error("invalid time (expected HH:MM): {0}")]
    InvalidTime(String),
    #[error("invalid ticket status: {0}")]
    InvalidTicketStatus(String),
}

/// Waste categories collected by the municipality.
///
/// Wire strings match the ward-administrator documents exactly, including
/// the space in `"Non Recyclable"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WasteType {
    Degradable,
    Recyclable,
    #[serde(rename = "Non Recyclable")]
    NonRecyclable,
}

impl WasteType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Degradable => "Degradable",
            Self::Recyclable => "Recyclable",
            Self::NonRecyclable => "Non Recyclable",
        }
    }
}

impl std::fmt::Display for WasteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WasteType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Degradable" => Ok(Self::Degradable),
            "Recyclable" => Ok(Self::Recyclable),
            "Non Recyclable" => Ok(Self::NonRecyclable),
            other => Err(CoreError::InvalidWasteType(other.to_string())),
        }
    }
}

/// Weekday with the Sunday-first ordering used by rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

/// Fixed weekday table, indexed by days-from-Sunday.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sunday,
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
];

impl Weekday {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDay`] if `name` is not one of the seven
    /// weekday names.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        WEEKDAYS
            .into_iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| CoreError::InvalidDay(name.to_string()))
    }

    /// Weekday of a calendar date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        let index = chrono::Datelike::weekday(&date).num_days_from_sunday() as usize;
        WEEKDAYS[index]
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A rule's `day` field: a specific weekday, or the `"All"` sentinel
/// meaning every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayRule {
    All,
    On(Weekday),
}

impl DayRule {
    /// Whether this rule applies on the given weekday.
    #[must_use]
    pub fn matches(self, weekday: Weekday) -> bool {
        match self {
            Self::All => true,
            Self::On(day) => day == weekday,
        }
    }
}

impl TryFrom<String> for DayRule {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "All" {
            Ok(Self::All)
        } else {
            Weekday::from_name(&value).map(Self::On)
        }
    }
}

impl From<DayRule> for String {
    fn from(value: DayRule) -> Self {
        match value {
            DayRule::All => "All".to_string(),
            DayRule::On(day) => day.name().to_string(),
        }
    }
}

/// Minute-precision time of day, stored as `"HH:MM"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTime`] unless `s` is `HH:MM` with a valid
    /// hour and minute.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| CoreError::InvalidTime(s.to_string()))
    }

    #[must_use]
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl std::fmt::Display for SlotTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for SlotTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

/// Collection window during which a waste type is expected to be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: SlotTime,
    pub end: SlotTime,
}

impl TimeSlot {
    /// Whether `time` falls inside the window, endpoints included.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start.time() && time <= self.end.time()
    }
}

/// A weekly recurring collection rule owned by a ward. Read-only for the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRule {
    #[serde(default)]
    pub id: String,
    pub waste_type: WasteType,
    pub day: DayRule,
    pub frequency: String,
    #[serde(default)]
    pub time_slot: Option<TimeSlot>,
}

/// Label shown for a projected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Tomorrow,
    Weekday(Weekday),
}

impl std::fmt::Display for DayLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Today => f.write_str("Today"),
            Self::Tomorrow => f.write_str("Tomorrow"),
            Self::Weekday(day) => f.write_str(day.name()),
        }
    }
}

/// One concrete calendar day of the projected schedule. Derived, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedEvent {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub day_label: DayLabel,
    pub collections: Vec<CollectionRule>,
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A vehicle's operational state. Only active and paused trucks take part
/// in proximity evaluation; anything else is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteStatus {
    Active,
    Paused,
    Other(String),
}

impl RouteStatus {
    #[must_use]
    pub fn is_on_route(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }
}

impl From<String> for RouteStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "paused" => Self::Paused,
            _ => Self::Other(value),
        }
    }
}

impl From<RouteStatus> for String {
    fn from(value: RouteStatus) -> Self {
        match value {
            RouteStatus::Active => "active".to_string(),
            RouteStatus::Paused => "paused".to_string(),
            RouteStatus::Other(s) => s,
        }
    }
}

/// Live position of a collection truck, updated by an external tracking
/// process. Read-only for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePosition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub supervisor_id: String,
    #[serde(default)]
    pub number_plate: Option<String>,
    #[serde(default)]
    pub current_location: Option<Coordinate>,
    pub route_status: RouteStatus,
}

/// A truck within the proximity radius, with its great-circle distance from
/// the user's home. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyVehicle {
    pub vehicle: VehiclePosition,
    pub distance_m: u32,
}

/// Municipal-council / district / ward hierarchy identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardPlacement {
    pub municipal_council: String,
    pub district: String,
    pub ward: String,
}

/// User profile document.
///
/// The hierarchy fields arrive separately (the council is chosen at signup,
/// district and ward at location confirmation), so they stay individually
/// optional here; [`UserProfile::placement`] yields the complete assignment
/// once all three are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub uid: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nic: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub municipal_council: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub home_location: Option<Coordinate>,
    #[serde(default)]
    pub notifications_enabled: bool,
}

impl UserProfile {
    /// Full ward assignment, or `None` until council, district, and ward
    /// are all set.
    #[must_use]
    pub fn placement(&self) -> Option<WardPlacement> {
        Some(WardPlacement {
            municipal_council: self.municipal_council.clone()?,
            district: self.district.clone()?,
            ward: self.ward.clone()?,
        })
    }

    /// Schedule, tracking, and report features stay unusable until the
    /// placement and home location are both confirmed.
    #[must_use]
    pub fn is_location_ready(&self) -> bool {
        self.placement().is_some() && self.home_location.is_some()
    }
}

/// Ticket lifecycle. `Resolved` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Assigned,
    Resolved,
    Cancelled,
}

impl TicketStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Cancelled)
    }
}

/// A missed-collection report created by the user and worked by ward staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: String,
    pub issue_type: String,
    pub waste_type: WasteType,
    pub notes: String,
    pub status: TicketStatus,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub home_location: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waste_type_wire_strings_round_trip() {
        let json = serde_json::to_string(&WasteType::NonRecyclable).unwrap();
        assert_eq!(json, "\"Non Recyclable\"");
        let back: WasteType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WasteType::NonRecyclable);
    }

    #[test]
    fn day_rule_parses_all_sentinel_and_weekdays() {
        let all: DayRule = serde_json::from_str("\"All\"").unwrap();
        assert_eq!(all, DayRule::All);
        let monday: DayRule = serde_json::from_str("\"Monday\"").unwrap();
        assert_eq!(monday, DayRule::On(Weekday::Monday));
        assert!(serde_json::from_str::<DayRule>("\"Mondy\"").is_err());
    }

    #[test]
    fn slot_time_rejects_malformed_strings() {
        assert!(SlotTime::parse("08:00").is_ok());
        assert!(SlotTime::parse("8am").is_err());
        assert!(SlotTime::parse("25:00").is_err());
    }

    #[test]
    fn weekday_of_uses_sunday_first_table() {
        // 2025-01-05 was a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(Weekday::of(sunday), Weekday::Sunday);
        assert_eq!(Weekday::of(sunday.succ_opt().unwrap()), Weekday::Monday);
    }

    #[test]
    fn route_status_keeps_unknown_strings() {
        let status: RouteStatus = serde_json::from_str("\"maintenance\"").unwrap();
        assert_eq!(status, RouteStatus::Other("maintenance".to_string()));
        assert!(!status.is_on_route());
        assert!(RouteStatus::Paused.is_on_route());
    }

    #[test]
    fn collection_rule_parses_store_document_shape() {
        let rule: CollectionRule = serde_json::from_str(
            r#"{
                "wasteType": "Recyclable",
                "day": "Monday",
                "frequency": "Weekly",
                "timeSlot": { "start": "08:00", "end": "10:00" }
            }"#,
        )
        .unwrap();
        assert_eq!(rule.waste_type, WasteType::Recyclable);
        assert_eq!(rule.day, DayRule::On(Weekday::Monday));
        let slot = rule.time_slot.unwrap();
        assert_eq!(slot.start.to_string(), "08:00");
        assert!(slot.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(!slot.contains(NaiveTime::from_hms_opt(10, 1, 0).unwrap()));
    }

    #[test]
    fn placement_requires_all_three_levels() {
        let mut profile: UserProfile = serde_json::from_str(
            r#"{ "name": "Amal", "email": "amal@example.com", "municipalCouncil": "CMC" }"#,
        )
        .unwrap();
        assert!(profile.placement().is_none());
        assert!(!profile.is_location_ready());

        profile.district = Some("D1".to_string());
        profile.ward = Some("W3".to_string());
        profile.home_location = Some(Coordinate {
            latitude: 6.9271,
            longitude: 79.8612,
        });
        assert!(profile.placement().is_some());
        assert!(profile.is_location_ready());
    }

    #[test]
    fn ticket_status_terminal_states() {
        assert!(TicketStatus::Resolved.is_terminal());
        assert!(TicketStatus::Cancelled.is_terminal());
        assert!(!TicketStatus::Pending.is_terminal());
        assert!(!TicketStatus::Assigned.is_terminal());
    }
}
