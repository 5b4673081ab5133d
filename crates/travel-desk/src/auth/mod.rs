//! Bearer-token authentication and trip request authorization.

pub mod error;
mod extract;
pub mod policy;
pub mod principal;
pub mod token;

pub use error::AuthError;
pub use policy::{authorize, TripAction};
pub use principal::Principal;
pub use token::{IssuedToken, TokenClaims, TokenService};
