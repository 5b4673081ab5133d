//! User accounts: registration, login, and the admin bootstrap.

pub mod domain;
pub mod password;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{AuthSession, Credentials, PublicUser, Registration, Role, User, UserId};
pub use repository::UserRepository;
pub use router::account_router;
pub use service::{AccountError, AccountService};
