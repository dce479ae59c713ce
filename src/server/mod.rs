// JSON API for SQLi Sentinel
//
// router.rs wires routes onto handlers/, state.rs holds the shared
// orchestrator, error.rs maps engine errors onto HTTP responses.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
