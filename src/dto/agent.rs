use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub agent_id: String,
    pub name: String,
    /// Hierarchy level: `master`, `sub_agent` or `retail`.
    pub level: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEnvelope {
    pub agent: AgentDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsEnvelope {
    pub agents: Vec<AgentDto>,
}
