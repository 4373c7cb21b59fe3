//! Tagging frame selection.

use regex::{Regex, RegexBuilder};

use crate::host::{find_all, NodeKind, SceneNode};

/// Matches frames whose name contains the tagging token, ignoring case.
#[derive(Debug, Clone)]
pub struct FrameSelector {
    pattern: Regex,
}

impl FrameSelector {
    pub fn new(token: &str) -> figbridge_core::Result<Self> {
        let pattern = RegexBuilder::new(&regex::escape(token))
            .case_insensitive(true)
            .build()
            .map_err(|e| figbridge_core::Error::Config(format!("tag token {:?}: {}", token, e)))?;
        Ok(Self { pattern })
    }

    pub fn matches<N: SceneNode>(&self, node: &N) -> bool {
        node.kind() == NodeKind::Frame && self.pattern.is_match(node.name())
    }

    /// Tagging frames under `page`, in traversal order.
    pub fn select<'a, N: SceneNode>(&self, page: &'a N) -> Vec<&'a N> {
        find_all(page, |n| self.matches(n))
    }
}
