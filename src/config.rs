//! Book configuration

use crate::measure::StyleProfile;
use crate::paginate::PageBudget;
use crate::schedule::Viewport;
use crate::Result;
use serde::{Deserialize, Serialize};

/// What assembly does while some topics are still waiting for measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingPolicy {
    /// Fail with `NotReady` and keep showing the previous slides
    #[default]
    Withhold,
    /// Show each pending topic's full text as a single page
    Unpaginated,
}

/// Tunables for a [`crate::Book`]. Every field has a default, so `{}` is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookConfig {
    /// Inner page padding in px
    pub padding: f32,
    /// Space kept for the page footer in px
    pub reserved_footer: f32,
    /// Quiet period before a pass runs
    pub debounce_ms: u64,
    pub pending_policy: PendingPolicy,
    pub style: StyleProfile,
    pub initial_viewport: Viewport,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            padding: 24.0,
            reserved_footer: 40.0,
            debounce_ms: 200,
            pending_policy: PendingPolicy::Withhold,
            style: StyleProfile::default(),
            initial_viewport: Viewport::default(),
        }
    }
}

impl BookConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Page budget for a viewport under this config
    pub fn budget_for(&self, viewport: Viewport) -> PageBudget {
        PageBudget::for_viewport(viewport, self.padding, self.reserved_footer)
    }
}
