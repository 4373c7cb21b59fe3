//! Snapshot assembly: document globals plus every flattened tagging frame.

use tracing::info;

use crate::flatten::{collect_component_refs, collect_text_entries};
use crate::host::{DocumentContext, SceneNode};
use crate::select::FrameSelector;
use crate::types::{Frame, FrameTag, Payload};

/// Counts reported to the user after collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub frames: usize,
    pub texts: usize,
}

impl Payload {
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            frames: self.frames.len(),
            texts: self.frames.iter().map(|f| f.text_nodes.len()).sum(),
        }
    }
}

/// Build a fresh payload from the live document. Read-only.
pub fn collect_snapshot<D: DocumentContext>(
    doc: &D,
    selector: &FrameSelector,
) -> figbridge_core::Result<Payload> {
    let page = doc.current_page()?;

    let frames: Vec<Frame> = selector
        .select(page)
        .into_iter()
        .map(|f| Frame {
            id: f.id().to_string(),
            name: f.name().to_string(),
            node_type: FrameTag::Frame,
            text_nodes: collect_text_entries(f),
            components: collect_component_refs(f),
        })
        .collect();

    let payload = Payload {
        file_key: doc.file_key(),
        file_name: doc.root_name(),
        page_id: page.id().to_string(),
        page_name: page.name().to_string(),
        frames,
    };

    let stats = payload.stats();
    info!(
        "Collected {} tagging frame(s), {} text(s) from page {}",
        stats.frames, stats.texts, payload.page_name
    );
    Ok(payload)
}
