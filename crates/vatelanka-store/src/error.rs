use thiserror::Error;

use vatelanka_core::{ValidationError, WasteType};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Ward assignment or home location missing. Surfaced as a blocking
    /// "set your location" prompt, never retried automatically.
    #[error("location not set")]
    LocationNotSet,
    /// The home location has already been confirmed and is locked.
    #[error("home location is locked and cannot be changed")]
    LocationLocked,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("malformed document at {path}: {reason}")]
    Malformed { path: String, reason: String },
    #[error("{0} is not scheduled for collection today")]
    NotScheduledToday(WasteType),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("this email is already registered")]
    EmailAlreadyRegistered,
    #[error("invalid email or password")]
    InvalidCredentials,
    /// An account with `email_verified == false` must be treated as
    /// logged out by the consuming app.
    #[error("email address is not verified")]
    EmailNotVerified,
    #[error("no account registered for {0}")]
    UnknownEmail(String),
    #[error("auth backend error: {0}")]
    Backend(String),
}
