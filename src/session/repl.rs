/// A line typed into the interactive roadmap view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip one task's details open or closed.
    Toggle { stage_id: String, task_id: String },
    ExpandAll,
    CollapseAll,
    /// Re-render the stages.
    Show,
    References,
    Help,
    Quit,
    /// Blank input — nothing to do.
    Empty,
    /// Unrecognized input, kept for the error message.
    Invalid(String),
}

pub const HELP: &str = "Commands:\n  \
    toggle <stage-id> <task-id>   show or hide a task's details (also: t)\n  \
    expand-all | collapse-all     open or close every task\n  \
    show                          print the roadmap again\n  \
    refs                          print the references\n  \
    help                          this message\n  \
    quit                          leave the session (also: q, exit)";

impl Command {
    pub fn parse(input: &str) -> Self {
        let mut words = input.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Empty;
        };
        let args: Vec<&str> = words.collect();

        match (head.to_lowercase().as_str(), args.as_slice()) {
            ("toggle" | "t", [stage_id, task_id]) => Command::Toggle {
                stage_id: stage_id.to_string(),
                task_id: task_id.to_string(),
            },
            ("expand-all" | "expand", []) => Command::ExpandAll,
            ("collapse-all" | "collapse", []) => Command::CollapseAll,
            ("show" | "ls", []) => Command::Show,
            ("refs" | "references", []) => Command::References,
            ("help" | "?", _) => Command::Help,
            ("quit" | "q" | "exit", []) => Command::Quit,
            _ => Command::Invalid(input.trim().to_string()),
        }
    }
}
