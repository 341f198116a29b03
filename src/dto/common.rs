/// Query filters for `GET /sports/events`.
#[derive(Debug, Clone, Default)]
pub struct SportEventQuery {
    pub sport: Option<String>,
    pub league: Option<String>,
    pub live_only: bool,
}

impl SportEventQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(sport) = &self.sport {
            params.push(("sport", sport.clone()));
        }
        if let Some(league) = &self.league {
            params.push(("league", league.clone()));
        }
        if self.live_only {
            params.push(("live", "true".to_string()));
        }
        params
    }
}

/// Query filters for `GET /bets`.
#[derive(Debug, Clone, Default)]
pub struct BetQuery {
    pub agent_id: Option<String>,
    pub status: Option<String>,
    pub event_id: Option<String>,
}

impl BetQuery {
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(agent_id) = &self.agent_id {
            params.push(("agentId", agent_id.clone()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(event_id) = &self.event_id {
            params.push(("eventId", event_id.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_event_query_params() {
        let query = SportEventQuery {
            sport: Some("football".to_string()),
            league: None,
            live_only: true,
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("sport", "football".to_string()),
                ("live", "true".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_query_has_no_params() {
        assert!(SportEventQuery::default().to_params().is_empty());
        assert!(BetQuery::default().to_params().is_empty());
    }
}
