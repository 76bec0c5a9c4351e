//! Registration store and query engine for the SEDP programme.
//!
//! - [`repository`]: validated append/replace/delete over registrations
//! - [`workflow`]: pending → approved/rejected transitions and unique IDs
//! - [`query`]: filtering and statistics
//! - [`export`]: CSV and plain-text report output
//! - [`registries`]: fee schedule and content lists
//!
//! Storage, time, notification delivery and authentication are all ports
//! ([`sedp_db::SlotStore`], [`Clock`], [`Notifier`], [`Authenticator`]).

pub mod auth;
pub mod clock;
pub mod error;
pub mod export;
pub mod notify;
pub mod query;
pub mod registries;
pub mod repository;
mod slots;
pub mod workflow;

pub use auth::{Authenticator, Credentials};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use notify::{Notifier, NullNotifier, TracingNotifier};
pub use query::{RegistrationFilter, Selector};
pub use registries::{ContentRecord, Registry};
pub use repository::RegistrationRepository;
pub use workflow::{ApprovalWorkflow, Decision};
