pub mod account;
pub mod agent;
pub mod bet;
pub mod sport_event;

pub use account::FantasyAccount;
pub use agent::{AgentLevel, FantasyAgent};
pub use bet::{ExternalBetStatus, FantasyBet};
pub use sport_event::{FantasySportEvent, SportEventStatus};
