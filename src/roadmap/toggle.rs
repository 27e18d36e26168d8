use std::collections::BTreeSet;
use std::sync::Arc;

use super::types::{Stage, Task};

/// Flip `expanded` on the task identified by `(stage_id, task_id)`.
///
/// Returns a new stage list. Every stage and task other than the toggled one
/// is the same `Arc` as in `stages`, so callers can detect changes with
/// `Arc::ptr_eq`. With no matching task the result shares every entry.
pub fn toggle_task(stages: &[Arc<Stage>], stage_id: &str, task_id: &str) -> Vec<Arc<Stage>> {
    stages
        .iter()
        .map(|stage| {
            if stage.id != stage_id {
                return Arc::clone(stage);
            }
            let Some(pos) = stage.tasks.iter().position(|t| t.id == task_id) else {
                return Arc::clone(stage);
            };

            let task = &stage.tasks[pos];
            let mut next = Stage::clone(stage);
            next.tasks[pos] = Arc::new(Task {
                expanded: !task.expanded,
                ..Task::clone(task)
            });
            Arc::new(next)
        })
        .collect()
}

/// Identifies a task across re-parses of the same roadmap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskKey {
    pub stage_id: String,
    pub task_id: String,
}

impl TaskKey {
    pub fn new(stage_id: &str, task_id: &str) -> Self {
        Self {
            stage_id: stage_id.to_string(),
            task_id: task_id.to_string(),
        }
    }
}

/// Caller-owned expansion state, kept apart from parsed stages so a fresh
/// parse can be re-expanded with [`ExpansionState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<TaskKey>,
}

impl ExpansionState {
    pub fn is_expanded(&self, stage_id: &str, task_id: &str) -> bool {
        self.expanded.contains(&TaskKey::new(stage_id, task_id))
    }

    /// Reducer: a new state with the given task's expansion flipped.
    pub fn toggle(&self, stage_id: &str, task_id: &str) -> Self {
        let mut expanded = self.expanded.clone();
        let key = TaskKey::new(stage_id, task_id);
        if !expanded.remove(&key) {
            expanded.insert(key);
        }
        Self { expanded }
    }

    /// Every task in `stages` expanded.
    pub fn expand_all(stages: &[Arc<Stage>]) -> Self {
        let expanded = stages
            .iter()
            .flat_map(|s| s.tasks.iter().map(move |t| TaskKey::new(&s.id, &t.id)))
            .collect();
        Self { expanded }
    }

    /// Number of expanded tasks.
    pub fn count(&self) -> usize {
        self.expanded.len()
    }

    /// Project this state onto `stages`, toggling only the tasks whose flag
    /// disagrees. Keys with no matching task are ignored.
    pub fn apply(&self, stages: &[Arc<Stage>]) -> Vec<Arc<Stage>> {
        let stale: Vec<(String, String)> = stages
            .iter()
            .flat_map(|s| {
                s.tasks
                    .iter()
                    .filter(move |t| t.expanded != self.is_expanded(&s.id, &t.id))
                    .map(move |t| (s.id.clone(), t.id.clone()))
            })
            .collect();

        stale
            .iter()
            .fold(stages.to_vec(), |acc, (stage_id, task_id)| {
                toggle_task(&acc, stage_id, task_id)
            })
    }
}
