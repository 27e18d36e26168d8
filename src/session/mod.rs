pub mod repl;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::roadmap::render::{render_references, render_stages};
use crate::roadmap::{ExpansionState, RoadmapView};

use repl::Command;

/// What the loop should do after handling one command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Print(String),
    Quit,
}

/// Interactive view over one parsed roadmap. Expansion lives in
/// [`ExpansionState`]; the view's stages are re-projected after each change.
pub struct Session {
    view: RoadmapView,
    expansion: ExpansionState,
}

impl Session {
    pub fn new(view: RoadmapView) -> Self {
        Self {
            view,
            expansion: ExpansionState::default(),
        }
    }

    #[cfg(test)]
    fn view(&self) -> &RoadmapView {
        &self.view
    }

    fn has_task(&self, stage_id: &str, task_id: &str) -> bool {
        self.view
            .stages
            .iter()
            .any(|s| s.id == stage_id && s.tasks.iter().any(|t| t.id == task_id))
    }

    fn set_expansion(&mut self, expansion: ExpansionState) {
        self.view.stages = expansion.apply(&self.view.stages);
        self.expansion = expansion;
    }

    pub fn handle(&mut self, cmd: Command) -> Step {
        match cmd {
            Command::Toggle { stage_id, task_id } => {
                if !self.has_task(&stage_id, &task_id) {
                    return Step::Print(format!(
                        "No task `{}` in stage `{}`. Use `show` to list ids.",
                        task_id, stage_id
                    ));
                }
                self.set_expansion(self.expansion.toggle(&stage_id, &task_id));
                Step::Print(render_stages(&self.view.stages))
            }
            Command::ExpandAll => {
                self.set_expansion(ExpansionState::expand_all(&self.view.stages));
                Step::Print(render_stages(&self.view.stages))
            }
            Command::CollapseAll => {
                self.set_expansion(ExpansionState::default());
                Step::Print(render_stages(&self.view.stages))
            }
            Command::Show => Step::Print(render_stages(&self.view.stages)),
            Command::References => Step::Print(render_references(&self.view.references)),
            Command::Help => Step::Print(repl::HELP.to_string()),
            Command::Quit => Step::Quit,
            Command::Empty => Step::Print(String::new()),
            Command::Invalid(input) => {
                Step::Print(format!("Unknown command `{}`. Type `help` for options.", input))
            }
        }
    }
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run(view: RoadmapView) -> Result<()> {
    let mut session = Session::new(view);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{}\n> ", repl::HELP).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let cmd = Command::parse(&line);
        debug!(cmd = ?cmd, "session command");

        match session.handle(cmd) {
            Step::Quit => break,
            Step::Print(out) => {
                stdout.write_all(out.as_bytes()).await?;
                if !out.is_empty() && !out.ends_with('\n') {
                    stdout.write_all(b"\n").await?;
                }
                stdout.write_all(b"> ").await?;
                stdout.flush().await?;
            }
        }
    }

    debug!(expanded = session.expansion.count(), "session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::{build_view, RoadmapDocument};

    fn session() -> Session {
        Session::new(build_view(&RoadmapDocument {
            roadmap_text: "**Stage 1: S**\n**Task 1.1: A**\n*Guidance:* alpha\n\
                           **Task 1.2: B**\n*Guidance:* beta\n"
                .to_string(),
            keywords: vec!["k".to_string()],
            references_text: String::new(),
        }))
    }

    fn toggle(stage: &str, task: &str) -> Command {
        Command::Toggle {
            stage_id: stage.to_string(),
            task_id: task.to_string(),
        }
    }

    #[test]
    fn test_toggle_expands_then_collapses() {
        let mut s = session();
        let Step::Print(out) = s.handle(toggle("stage-1", "task-1-2")) else {
            panic!("expected output");
        };
        assert!(out.contains("beta"));
        assert!(!out.contains("alpha"));
        assert!(s.view().stages[0].tasks[1].expanded);

        s.handle(toggle("stage-1", "task-1-2"));
        assert!(!s.view().stages[0].tasks[1].expanded);
    }

    #[test]
    fn test_unknown_task_is_reported() {
        let mut s = session();
        let Step::Print(out) = s.handle(toggle("stage-1", "task-9-9")) else {
            panic!("expected output");
        };
        assert!(out.contains("No task `task-9-9`"));
        assert!(s.view().stages[0].tasks.iter().all(|t| !t.expanded));
    }

    #[test]
    fn test_expand_and_collapse_all() {
        let mut s = session();
        s.handle(Command::ExpandAll);
        assert!(s.view().stages[0].tasks.iter().all(|t| t.expanded));
        s.handle(Command::CollapseAll);
        assert!(s.view().stages[0].tasks.iter().all(|t| !t.expanded));
    }

    #[test]
    fn test_refs_and_quit() {
        let mut s = session();
        assert_eq!(
            s.handle(Command::References),
            Step::Print("- [ref-1] Research on k\n".to_string())
        );
        assert_eq!(s.handle(Command::Quit), Step::Quit);
    }
}
