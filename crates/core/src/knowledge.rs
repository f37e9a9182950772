//! The knowledge blobs that seed every conversation.

use serde::{Deserialize, Serialize};

/// Profile summary and profile document text.
///
/// Either field may be empty when ingestion was skipped or failed. Fields are
/// private so the context cannot change after construction; share it behind
/// an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeContext {
    profile_summary: String,
    profile_document: String,
}

impl KnowledgeContext {
    pub fn new(profile_summary: impl Into<String>, profile_document: impl Into<String>) -> Self {
        Self {
            profile_summary: profile_summary.into(),
            profile_document: profile_document.into(),
        }
    }

    /// A context with no knowledge at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn profile_summary(&self) -> &str {
        &self.profile_summary
    }

    pub fn profile_document(&self) -> &str {
        &self.profile_document
    }

    pub fn is_empty(&self) -> bool {
        self.profile_summary.is_empty() && self.profile_document.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context() {
        assert!(KnowledgeContext::empty().is_empty());
        assert!(!KnowledgeContext::new("summary", "").is_empty());
    }

    #[test]
    fn accessors_return_blobs() {
        let ctx = KnowledgeContext::new("I build compilers.", "Experience: ...");
        assert_eq!(ctx.profile_summary(), "I build compilers.");
        assert_eq!(ctx.profile_document(), "Experience: ...");
    }
}
