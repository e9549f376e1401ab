//! Activation codes: admin-issued, single-use grants of timed `pro` access.
//!
//! Codes are generated in bulk, handed out manually (payment happens
//! entirely out of band), and redeemed at most once. The lifecycle is
//! `Issued -> Redeemed` with no other transitions: unredeemed codes never
//! expire and cannot be cancelled; redeemed codes may be bulk-deleted as
//! housekeeping.
//!
//! Redemption is guarded by a conditional database update so two concurrent
//! attempts on the same code cannot both succeed.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{ActivationError, ActivationResult};
pub use manager::ActivationManager;
pub use models::{ActivationCode, Redemption};
