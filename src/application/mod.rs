//! Application layer: flow services and the observable state store.
//!
//! Each flow is driven by a UI event, calls the external collaborators
//! through ports, and records its progress in the shared `StateStore`.

pub mod store;

mod session;
mod submission;
mod sync;
mod verify;

pub use session::SessionService;
pub use store::{BannerKind, DashboardState, StateStore, StatusBanner};
pub use submission::SubmissionService;
pub use sync::SyncService;
pub use verify::{VerifyOutcome, VerifyService};
