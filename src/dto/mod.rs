pub mod account;
pub mod agent;
pub mod auth;
pub mod bet;
pub mod common;
pub mod sport_event;

// Re-export commonly used types for convenience
pub use account::*;
pub use agent::*;
pub use auth::*;
pub use bet::*;
pub use common::*;
pub use sport_event::*;
