//! The agent catalog: identity → definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// One registered agent, as declared in `agents/<owner>/agent.yml` plus the
/// sibling `prompt.md`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    #[serde(default)]
    pub name: String,
    /// Registry key. `username` is accepted as a legacy spelling.
    #[serde(default, alias = "username")]
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Free-form trigger hints consumed by the observer. Absent or null means
    /// auto-detect.
    #[serde(default)]
    pub trigger_conditions: Option<Vec<String>>,
    /// Whether this agent runs the staged pipeline instead of a single shot.
    #[serde(default)]
    pub multistage: bool,
    /// Prompt body, loaded from `prompt.md` (front matter stripped).
    #[serde(skip)]
    pub prompt: String,
}

#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: BTreeMap<String, AgentSpec>,
}

impl AgentCatalog {
    pub fn insert(&mut self, spec: AgentSpec) {
        self.agents.insert(spec.owner.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AgentSpec)> {
        self.agents.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
