use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw generator output, as returned by the roadmap service or loaded from disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoadmapDocument {
    pub roadmap_text: String,
    pub keywords: Vec<String>,
    pub references_text: String,
}

/// A top-level phase of a research roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// `stage-<N>`, suffixed with `-<k>` for the k-th duplicate of the same number.
    pub id: String,
    /// Display title, e.g. "Stage 1: Foundations".
    pub title: String,
    pub description: String,
    pub tasks: Vec<Arc<Task>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `task-<N>-<M>` for task `N.M`, deduplicated per stage like stage ids.
    pub id: String,
    pub title: String,
    pub guidance: String,
    pub background: String,
    pub methodology: String,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub link: String,
}

/// A citation entry. Placeholder references carry `url == "#"` and no resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub title: String,
    pub url: String,
    pub resources: Vec<ResourceLink>,
}

/// Everything the renderer needs for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapView {
    pub stages: Vec<Arc<Stage>>,
    pub references: Vec<Reference>,
    pub generated_at: DateTime<Utc>,
}

impl RoadmapView {
    /// True when no stages could be extracted; the caller shows a "no data" state.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.stages.iter().map(|s| s.tasks.len()).sum()
    }
}

/// Hands out ids, appending an occurrence suffix when a base id repeats.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    seen: HashMap<String, usize>,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}
