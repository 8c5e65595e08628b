//! Type definitions for rolecall storage.

mod ids;
mod invitations;
mod members;
mod roles;

// Re-export all types from submodules
pub use ids::*;
pub use invitations::*;
pub use members::*;
pub use roles::*;
