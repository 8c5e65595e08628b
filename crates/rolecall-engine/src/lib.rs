//! Staffing negotiation engine.
//!
//! Organizers define roles for an event and invite managers; managers accept,
//! decline or counter-offer once; the organizer selects exactly one candidate
//! per role. [`AssignmentCoordinator`] is the entry point. It serializes all
//! mutations of a role and publishes a notification for every visible change.
//!
//! ```ignore
//! let store = Arc::new(MemoryStore::new());
//! let config = EngineConfig::from_env()?;
//! let notifications = Arc::new(config.notification_store());
//! let engine = AssignmentCoordinator::new(store, notifications, &config);
//!
//! let invitation = engine.invite(role.id, manager.id, None).await?;
//! engine.respond(invitation.id, Decision::Accept, None).await?;
//! engine.select(invitation.id).await?;
//! ```

mod catalog;
mod clock;
mod config;
mod coordinator;
mod error;
mod ledger;
pub mod metrics;
mod notices;

pub use catalog::{NewRole, RoleCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, FEED_CAPACITY_VAR, MAX_INVITATIONS_VAR};
pub use coordinator::{AssignmentCoordinator, RoleBoard};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use ledger::{Decision, InvitationLedger, InvitationView};
