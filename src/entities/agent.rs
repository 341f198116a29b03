use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::AgentDto;
use crate::error::ValidationError;

/// Position in the agent hierarchy. Lower rank means broader authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentLevel {
    Master,
    SubAgent,
    Retail,
}

impl AgentLevel {
    pub fn rank(&self) -> u8 {
        match self {
            AgentLevel::Master => 1,
            AgentLevel::SubAgent => 2,
            AgentLevel::Retail => 3,
        }
    }

    fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "master" => Ok(AgentLevel::Master),
            "sub_agent" => Ok(AgentLevel::SubAgent),
            "retail" => Ok(AgentLevel::Retail),
            other => Err(ValidationError::new(
                "level",
                format!("unknown agent level: {other}"),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FantasyAgent {
    id: Uuid,
    agent_id: String,
    name: String,
    level: AgentLevel,
    active: bool,
}

impl FantasyAgent {
    pub fn from_external_data(dto: AgentDto) -> Result<Self, ValidationError> {
        if dto.agent_id.is_empty() {
            return Err(ValidationError::new("agentId", "must not be empty"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            agent_id: dto.agent_id,
            name: dto.name,
            level: AgentLevel::parse(&dto.level)?,
            active: dto.active,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> AgentLevel {
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Masters manage anyone; sub-agents manage retail only; retail agents
    /// manage nobody.
    pub fn can_manage(&self, other: &FantasyAgent) -> bool {
        match self.level {
            AgentLevel::Master => true,
            AgentLevel::SubAgent => other.level == AgentLevel::Retail,
            AgentLevel::Retail => false,
        }
    }
}
