//! Trip request intake, the admin dashboard API, and the status lifecycle.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    NewTripRequest, OwnerSummary, TripRequest, TripRequestEntry, TripRequestId, TripSubmission,
};
pub use repository::TripRequestStore;
pub use router::{trip_router, StatusUpdate, TripState};
pub use service::{TripRequestService, TripServiceError};
pub use status::{TransitionError, TripStatus};
