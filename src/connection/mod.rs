//! Connection lifecycle management
//!
//! One [`ConnectionManager`] owns at most one live conversation link. Each
//! link runs as a background task that holds the transport exclusively and
//! reconnects with capped exponential backoff until it is explicitly closed.

mod link;
mod manager;
mod state;

pub use manager::ConnectionManager;
pub use state::ConnectionState;
