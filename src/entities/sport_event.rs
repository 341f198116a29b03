use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::SportEventDto;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportEventStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

impl SportEventStatus {
    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "scheduled" | "upcoming" => Ok(SportEventStatus::Scheduled),
            "live" | "in_play" => Ok(SportEventStatus::Live),
            "finished" | "completed" => Ok(SportEventStatus::Finished),
            "cancelled" | "canceled" => Ok(SportEventStatus::Cancelled),
            other => Err(ValidationError::new(
                "status",
                format!("unknown event status: {other}"),
            )),
        }
    }
}

/// Locally cached copy of an event lifecycled by the external system.
/// Refreshed by gateway calls; `fetched_at` marks the snapshot time.
#[derive(Debug, Clone)]
pub struct FantasySportEvent {
    id: Uuid,
    event_id: String,
    sport: String,
    league: Option<String>,
    home_team: String,
    away_team: String,
    start_time: DateTime<Utc>,
    status: SportEventStatus,
    fetched_at: DateTime<Utc>,
}

impl FantasySportEvent {
    pub fn from_external_data(dto: SportEventDto) -> Result<Self, ValidationError> {
        if dto.event_id.is_empty() {
            return Err(ValidationError::new("eventId", "must not be empty"));
        }
        if dto.home_team.is_empty() || dto.away_team.is_empty() {
            return Err(ValidationError::new("teams", "must not be empty"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            event_id: dto.event_id,
            sport: dto.sport,
            league: dto.league,
            home_team: dto.home_team,
            away_team: dto.away_team,
            start_time: dto.start_time,
            status: SportEventStatus::parse(&dto.status)?,
            fetched_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn sport(&self) -> &str {
        &self.sport
    }

    pub fn league(&self) -> Option<&str> {
        self.league.as_deref()
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn status(&self) -> SportEventStatus {
        self.status
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn is_live(&self) -> bool {
        self.status == SportEventStatus::Live
    }

    /// Age of this snapshot relative to now.
    pub fn snapshot_age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(status: &str) -> SportEventDto {
        SportEventDto {
            event_id: "evt-1".to_string(),
            sport: "football".to_string(),
            league: Some("Premier League".to_string()),
            home_team: "Home FC".to_string(),
            away_team: "Away FC".to_string(),
            start_time: Utc::now(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_maps_live_event() {
        let event = FantasySportEvent::from_external_data(dto("live")).unwrap();
        assert!(event.is_live());
        assert_eq!(event.home_team(), "Home FC");
        assert_eq!(event.league(), Some("Premier League"));
    }

    #[test]
    fn test_status_aliases() {
        let event = FantasySportEvent::from_external_data(dto("in_play")).unwrap();
        assert_eq!(event.status(), SportEventStatus::Live);
        let event = FantasySportEvent::from_external_data(dto("upcoming")).unwrap();
        assert_eq!(event.status(), SportEventStatus::Scheduled);
    }

    #[test]
    fn test_rejects_unknown_status_and_missing_fields() {
        assert!(FantasySportEvent::from_external_data(dto("postponed")).is_err());

        let mut bad = dto("live");
        bad.home_team = String::new();
        assert!(FantasySportEvent::from_external_data(bad).is_err());
    }
}
