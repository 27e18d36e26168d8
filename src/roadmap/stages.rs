use std::sync::Arc;

use super::types::{IdAllocator, Stage, Task};

const STAGE_MARKER: &str = "**Stage ";
const TASK_MARKER: &str = "**Task ";
const DESCRIPTION_LABEL: &str = "*Description:*";

/// Task field labels. The second element is the prefix that terminates a
/// sibling field, which matches even when the closing `*` is missing.
const GUIDANCE: (&str, &str) = ("*Guidance:*", "*Guidance:");
const BACKGROUND: (&str, &str) = ("*Background:*", "*Background:");
const METHODOLOGY: (&str, &str) = ("*Methodology:*", "*Methodology:");

/// A bold header such as `**Stage 2: Data collection**`, located in its source text.
///
/// Any marker + number + colon ends the previous block. Only headers whose
/// title closes with `**` on the same line produce a block of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header<'a> {
    /// Byte offset of the opening `**`.
    start: usize,
    /// Byte offset just past the closing `**`, or past the colon if unclosed.
    end: usize,
    number: &'a str,
    /// `None` when the title never closed.
    title: Option<&'a str>,
}

/// Which numbering a header kind carries: `N` for stages, `N.M` for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Plain,
    Dotted,
}

/// Length of the leading number in `s`, or `None` if it doesn't have the expected shape.
fn number_len(s: &str, numbering: Numbering) -> Option<usize> {
    let digits = |s: &str| s.bytes().take_while(u8::is_ascii_digit).count();

    let major = digits(s);
    if major == 0 {
        return None;
    }
    match numbering {
        Numbering::Plain => Some(major),
        Numbering::Dotted => {
            let rest = s[major..].strip_prefix('.')?;
            let minor = digits(rest);
            (minor > 0).then_some(major + 1 + minor)
        }
    }
}

/// Parse a header starting at `start` (which points at `marker`).
/// The title runs up to the closing `**` on the same line, if there is one.
fn parse_header<'a>(
    text: &'a str,
    start: usize,
    marker: &str,
    numbering: Numbering,
) -> Option<Header<'a>> {
    let after_marker = start + marker.len();
    let rest = &text[after_marker..];

    let num_len = number_len(rest, numbering)?;
    let number = &rest[..num_len];
    let rest = rest[num_len..].strip_prefix(':')?;

    let line = rest.split('\n').next().unwrap_or("");
    let after_colon = after_marker + num_len + 1;
    let (title, end) = match line.find("**") {
        Some(close) => (Some(line[..close].trim()), after_colon + close + 2),
        None => (None, after_colon),
    };

    Some(Header {
        start,
        end,
        number,
        title,
    })
}

/// All block boundaries of one kind, in source order, unclosed titles included.
fn find_headers<'a>(text: &'a str, marker: &str, numbering: Numbering) -> Vec<Header<'a>> {
    let mut headers = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(marker) {
        let start = pos + found;
        match parse_header(text, start, marker, numbering) {
            Some(header) => {
                pos = header.end;
                headers.push(header);
            }
            None => pos = start + marker.len(),
        }
    }

    headers
}

/// Pair each header with the text between it and the next header (or `text`'s end).
fn spans<'a>(text: &'a str, headers: &[Header<'a>]) -> Vec<(Header<'a>, &'a str)> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let end = headers.get(i + 1).map(|h| h.start).unwrap_or(text.len());
            (*header, &text[header.end..end])
        })
        .collect()
}

/// Text following `label` up to the earliest of `terminators` (or end of span), trimmed.
/// Empty when the label is absent.
fn labeled_field(span: &str, label: &str, terminators: &[&str]) -> String {
    let Some(idx) = span.find(label) else {
        return String::new();
    };
    let value = &span[idx + label.len()..];
    let end = terminators
        .iter()
        .filter_map(|t| value.find(t))
        .min()
        .unwrap_or(value.len());
    value[..end].trim().to_string()
}

fn extract_description(span: &str, tasks: &[Header<'_>]) -> String {
    let Some(idx) = span.find(DESCRIPTION_LABEL) else {
        return String::new();
    };
    let value_start = idx + DESCRIPTION_LABEL.len();
    // The description stops at the first task header after the label, wherever
    // that header sits relative to earlier tasks.
    let end = tasks
        .iter()
        .map(|t| t.start)
        .find(|&start| start >= value_start)
        .unwrap_or(span.len());
    span[value_start..end].trim().to_string()
}

fn task_field(span: &str, field: (&str, &str), others: [(&str, &str); 2]) -> String {
    labeled_field(span, field.0, &[others[0].1, others[1].1])
}

fn extract_task(header: Header<'_>, title: &str, span: &str, ids: &mut IdAllocator) -> Task {
    Task {
        id: ids.allocate(format!("task-{}", header.number.replace('.', "-"))),
        title: title.to_string(),
        guidance: task_field(span, GUIDANCE, [BACKGROUND, METHODOLOGY]),
        background: task_field(span, BACKGROUND, [GUIDANCE, METHODOLOGY]),
        methodology: task_field(span, METHODOLOGY, [GUIDANCE, BACKGROUND]),
        expanded: false,
    }
}

/// Extract stages and their tasks from generated roadmap markdown.
///
/// Expects blocks shaped like:
///
/// ```text
/// **Stage 1: Foundations**
/// *Description:* Build basics.
/// **Task 1.1: Read intro**
/// *Guidance:* Read chapter 1.
/// ```
///
/// Never fails: missing labels become empty strings, and text with no stage
/// headers yields an empty vec. Output order is source order, whatever the
/// embedded numbers say. A header whose title is not closed on its line is
/// dropped together with its body.
pub fn extract_stages(roadmap_text: &str) -> Vec<Arc<Stage>> {
    let stage_headers = find_headers(roadmap_text, STAGE_MARKER, Numbering::Plain);
    let mut stage_ids = IdAllocator::default();

    spans(roadmap_text, &stage_headers)
        .into_iter()
        .filter_map(|(header, span)| {
            let title = header.title?;
            let task_headers = find_headers(span, TASK_MARKER, Numbering::Dotted);
            let description = extract_description(span, &task_headers);

            let mut task_ids = IdAllocator::default();
            let tasks = spans(span, &task_headers)
                .into_iter()
                .filter_map(|(task, task_span)| {
                    let task_title = task.title?;
                    Some(Arc::new(extract_task(task, task_title, task_span, &mut task_ids)))
                })
                .collect();

            Some(Arc::new(Stage {
                id: stage_ids.allocate(format!("stage-{}", header.number)),
                title: format!("Stage {}: {}", header.number, title),
                description,
                tasks,
            }))
        })
        .collect()
}
