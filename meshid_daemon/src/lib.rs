//! meshid service: identifier suggestions, conflict checks, the occupancy
//! grid and name generation over HTTP/JSON.

pub mod error;
pub mod routes;
pub mod sources;
pub mod state;
pub mod store;

pub use routes::router;
pub use state::AppState;
