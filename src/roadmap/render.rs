use std::fmt::Write as _;
use std::sync::Arc;

use super::types::{Reference, RoadmapView, Stage, Task};

pub const EMPTY_ROADMAP: &str =
    "No roadmap stages could be extracted from the generated text. Try rephrasing your topic or goal.";
pub const EMPTY_REFERENCES: &str = "No references available for this roadmap.";

fn push_section(out: &mut String, label: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    let _ = writeln!(out, "      {}:", label);
    for line in body.lines() {
        let _ = writeln!(out, "        {}", line);
    }
}

fn render_task(out: &mut String, task: &Task) {
    let marker = if task.expanded { "[-]" } else { "[+]" };
    let _ = writeln!(out, "    {} {} ({})", marker, task.title, task.id);
    if !task.expanded {
        return;
    }
    push_section(out, "Guidance", &task.guidance);
    push_section(out, "Background", &task.background);
    push_section(out, "Methodology", &task.methodology);
}

/// Plain-text rendering of the stage list; expanded tasks show their details.
pub fn render_stages(stages: &[Arc<Stage>]) -> String {
    if stages.is_empty() {
        return format!("{}\n", EMPTY_ROADMAP);
    }

    let mut out = String::new();
    for stage in stages {
        let _ = writeln!(out, "## {} ({})", stage.title, stage.id);
        if !stage.description.is_empty() {
            for line in stage.description.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
        for task in &stage.tasks {
            render_task(&mut out, task);
        }
        out.push('\n');
    }
    out
}

pub fn render_references(references: &[Reference]) -> String {
    if references.is_empty() {
        return format!("{}\n", EMPTY_REFERENCES);
    }

    let mut out = String::new();
    for reference in references {
        let _ = writeln!(out, "- [{}] {}", reference.id, reference.title);
        if reference.url != "#" {
            let _ = writeln!(out, "    {}", reference.url);
        }
        for resource in &reference.resources {
            let _ = writeln!(
                out,
                "    * {} from {}: {}",
                resource.kind, resource.title, resource.link
            );
        }
    }
    out
}

pub fn render_view(view: &RoadmapView) -> String {
    format!(
        "# Research Roadmap\n\n{}# References\n\n{}",
        render_stages(&view.stages),
        render_references(&view.references)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roadmap::stages::extract_stages;
    use crate::roadmap::toggle::toggle_task;

    #[test]
    fn test_collapsed_tasks_hide_details() {
        let stages = extract_stages("**Stage 1: S**\n**Task 1.1: T**\n*Guidance:* secret detail");
        let text = render_stages(&stages);
        assert!(text.contains("[+] T (task-1-1)"));
        assert!(!text.contains("secret detail"));

        let text = render_stages(&toggle_task(&stages, "stage-1", "task-1-1"));
        assert!(text.contains("[-] T (task-1-1)"));
        assert!(text.contains("secret detail"));
        assert!(!text.contains("Background:"));
    }

    #[test]
    fn test_empty_states() {
        assert!(render_stages(&[]).contains(EMPTY_ROADMAP));
        assert!(render_references(&[]).contains(EMPTY_REFERENCES));
    }

    #[test]
    fn test_placeholder_reference_has_no_url_line() {
        let refs = vec![Reference {
            id: "ref-1".to_string(),
            title: "Research on nlp".to_string(),
            url: "#".to_string(),
            resources: vec![],
        }];
        assert_eq!(render_references(&refs), "- [ref-1] Research on nlp\n");
    }
}
