//! Typed persistence boundary for the VateLanka client engine.
//!
//! Everything behind this crate is a duck-typed document database, an
//! identity provider, and device-local key-value storage. Each gets a
//! trait here ([`DocumentStore`], [`AuthClient`], [`KeyValueStore`]) with
//! an in-memory implementation, and the modules on top expose the typed
//! operations the engine actually performs: profiles, hierarchy lookups,
//! schedule reads, live truck feeds, and missed-collection tickets.

pub mod auth;
pub mod client;
pub mod error;
pub mod hierarchy;
pub mod kv;
pub mod paths;
pub mod profile;
pub mod schedules;
pub mod tickets;
pub mod trucks;

pub use auth::{AuthClient, AuthUser, MemoryAuth};
pub use client::{Document, DocumentStore, MemoryStore, Subscription};
pub use error::{AuthError, StoreError};
pub use hierarchy::{fetch_districts, fetch_municipal_councils, fetch_wards, HierarchyEntry};
pub use kv::{KeyValueStore, MemoryKv};
pub use profile::{
    confirm_home_location, fetch_user_profile, notifications_enabled, require_user_profile,
    save_user_data, set_notifications_enabled, update_user_profile, NewUser, ProfileUpdate,
};
pub use schedules::{fetch_today_waste_types, fetch_user_schedules, fetch_ward_schedules};
pub use tickets::{create_ticket, fetch_user_tickets, watch_user_tickets, NewTicket, TicketFeed};
pub use trucks::{subscribe_ward_trucks, FleetSnapshot, TruckFeed};
