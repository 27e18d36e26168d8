pub mod references;
pub mod render;
pub mod stages;
pub mod toggle;
pub mod types;

use tracing::{info, warn};

pub use references::extract_references;
pub use stages::extract_stages;
pub use toggle::ExpansionState;
pub use types::{RoadmapDocument, RoadmapView};

/// Run both extraction passes over a generated document.
pub fn build_view(doc: &RoadmapDocument) -> RoadmapView {
    let stages = extract_stages(&doc.roadmap_text);
    let references = extract_references(&doc.references_text, &doc.keywords);

    let view = RoadmapView {
        stages,
        references,
        generated_at: chrono::Utc::now(),
    };

    if view.is_empty() {
        warn!(
            roadmap_len = doc.roadmap_text.len(),
            "no stages found in roadmap text"
        );
    }
    info!(
        stages = view.stages.len(),
        tasks = view.task_count(),
        references = view.references.len(),
        "roadmap parsed"
    );

    view
}
