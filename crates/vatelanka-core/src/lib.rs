//! Pure domain logic for the VateLanka waste-collection client: the typed
//! data model, the recurring-schedule projector, the proximity evaluator,
//! client-side validation, and the injectable clock and configuration the
//! rest of the workspace builds on.

pub mod clock;
pub mod config;
pub mod geo;
pub mod schedule;
pub mod types;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_engine_config, load_engine_config_from_env, ConfigError, EngineConfig};
pub use geo::{haversine_m, nearby, DEFAULT_NEARBY_RADIUS_M, EARTH_RADIUS_M};
pub use schedule::{project, today_collections, today_waste_types, HORIZON_WEEK};
pub use types::{
    CollectionRule, Coordinate, CoreError, DayLabel, DayRule, NearbyVehicle, ProjectedEvent,
    RouteStatus, SlotTime, Ticket, TicketStatus, TimeSlot, UserProfile, VehiclePosition,
    WardPlacement, WasteType, Weekday, MISSED_COLLECTION, WEEKDAYS,
};
pub use validate::ValidationError;
