use tracing::debug;

use super::types::{IdAllocator, Reference, ResourceLink};

const REFERENCE_MARKER: &str = "REFERENCE ";
const TITLE_LABEL: &str = "Title:";
const SOURCE_LABEL: &str = "Source Link:";
const RESOURCES_LABEL: &str = "Available Resources:";
const SUMMARY_LABEL: &str = "Summary:";

/// Lines belonging to one `REFERENCE <N>: <keyword>` block.
#[derive(Debug)]
struct RawBlock<'a> {
    number: &'a str,
    keyword: &'a str,
    lines: Vec<&'a str>,
}

/// Parse `REFERENCE <N>: <keyword>` into `(number, keyword)`.
fn parse_block_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim().strip_prefix(REFERENCE_MARKER)?;
    let (number, keyword) = rest.split_once(':')?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((number, keyword.trim()))
}

/// Split the references blob into header-delimited blocks. Text before the
/// first header (e.g. the "SCHOLARLY REFERENCE MATERIAL:" banner) is dropped.
fn split_blocks(text: &str) -> Vec<RawBlock<'_>> {
    let mut blocks: Vec<RawBlock<'_>> = Vec::new();

    for line in text.lines() {
        if let Some((number, keyword)) = parse_block_header(line) {
            blocks.push(RawBlock {
                number,
                keyword,
                lines: Vec::new(),
            });
        } else if let Some(current) = blocks.last_mut() {
            current.lines.push(line);
        }
    }

    blocks
}

/// Parse `<type> from <title>: <link>`. The link may be empty.
fn parse_resource(line: &str) -> Option<ResourceLink> {
    let item = line.trim_start().strip_prefix("- ")?;
    let (kind, rest) = item.split_once(" from ")?;
    let (title, link) = rest
        .split_once(": ")
        .or_else(|| rest.trim_end().strip_suffix(':').map(|t| (t, "")))?;

    Some(ResourceLink {
        kind: kind.trim().to_string(),
        title: title.trim().to_string(),
        link: link.trim().to_string(),
    })
}

/// Value of the first `label` line, searched only before the summary.
fn field<'a>(lines: &[&'a str], label: &str) -> Option<&'a str> {
    lines
        .iter()
        .copied()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(str::trim)
}

fn parse_block(block: &RawBlock<'_>) -> Option<(String, String, Vec<ResourceLink>)> {
    let summary_at = block
        .lines
        .iter()
        .position(|l| l.trim_start().starts_with(SUMMARY_LABEL))
        .unwrap_or(block.lines.len());
    let body = &block.lines[..summary_at];

    let title = field(body, TITLE_LABEL)?;
    let url = field(body, SOURCE_LABEL)?;

    let resources = body
        .iter()
        .position(|l| l.trim_start().starts_with(RESOURCES_LABEL))
        .map(|at| body[at + 1..].iter().filter_map(|l| parse_resource(l)).collect())
        .unwrap_or_default();

    Some((title.to_string(), url.to_string(), resources))
}

/// One stand-in reference per keyword, for when no citation block parsed.
fn placeholders(keywords: &[String]) -> Vec<Reference> {
    keywords
        .iter()
        .enumerate()
        .map(|(i, keyword)| Reference {
            id: format!("ref-{}", i + 1),
            title: format!("Research on {}", keyword),
            url: "#".to_string(),
            resources: Vec::new(),
        })
        .collect()
}

/// Extract citation entries from the scholar-reference text the roadmap
/// service returns alongside the roadmap.
///
/// Blocks missing a `Title:` or `Source Link:` line are skipped. If nothing
/// parses and `keywords` is non-empty, placeholder references are synthesized
/// instead; both empty yields an empty vec.
pub fn extract_references(references_text: &str, keywords: &[String]) -> Vec<Reference> {
    let mut ids = IdAllocator::default();
    let mut references = Vec::new();

    for block in split_blocks(references_text) {
        let Some((title, url, resources)) = parse_block(&block) else {
            debug!(
                number = block.number,
                keyword = block.keyword,
                "skipping reference block without title or source link"
            );
            continue;
        };

        references.push(Reference {
            id: ids.allocate(format!("ref-{}", block.number)),
            title: format!("{} ({})", title, block.keyword),
            url,
            resources,
        });
    }

    if references.is_empty() && !keywords.is_empty() {
        debug!(
            keyword_count = keywords.len(),
            "no references parsed, using keyword placeholders"
        );
        return placeholders(keywords);
    }

    references
}
