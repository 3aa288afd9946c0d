use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::progress::StepId;

/// Server-defined processing configuration, read-only on the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prompts: BTreeMap<String, PromptToggle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptToggle {
    #[serde(default)]
    pub enabled: bool,
}

impl Scenario {
    pub fn is_enabled(&self, prompt: &str) -> bool {
        self.prompts.get(prompt).map(|p| p.enabled).unwrap_or(false)
    }

    /// Steps to show for this scenario; conversion always runs.
    pub fn visible_steps(&self) -> Vec<StepId> {
        StepId::ALL
            .iter()
            .copied()
            .filter(|step| match step.prompt_key() {
                None => true,
                Some(key) => self.is_enabled(key),
            })
            .collect()
    }
}
