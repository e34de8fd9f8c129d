//! Portable export and schema-validated import of stories.
//!
//! Export selects a subtree of the vault and serializes it to the
//! id-keyed mapping form: pretty-printed JSON with 2-space indentation
//! and deterministic ordering, so consecutive exports of the same state
//! diff cleanly. Import runs every candidate story through the schema
//! validator before any mutation, then inserts each one under a fresh id;
//! payload ids are never merged onto existing stories.

use crate::id::StoryId;
use crate::model::{Story, StoryDraft};
use crate::schema::{validate_story, SchemaViolation};
use crate::store::StoryVault;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors from serializing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from an import attempt.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload rejected: {0}")]
    Rejected(ViolationList),
}

impl ImportError {
    /// The violation list for a rejected payload, empty otherwise.
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            ImportError::Rejected(list) => &list.0,
            ImportError::Json(_) => &[],
        }
    }
}

/// Wrapper giving a violation list a compact one-line rendering.
#[derive(Debug)]
pub struct ViolationList(pub Vec<SchemaViolation>);

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema violation(s)", self.0.len())?;
        for violation in &self.0 {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

impl StoryVault {
    /// Serialize the selected stories to the portable export form.
    ///
    /// With no ids, every story is exported; otherwise the given ids are
    /// selected and any that do not resolve are skipped silently. The
    /// returned text is an owned copy sharing no storage with the vault.
    pub fn export_json(&self, ids: Option<&[StoryId]>) -> Result<String, ExportError> {
        let selected: BTreeMap<&StoryId, &Story> = match ids {
            None => self.stories_map().iter().collect(),
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.story(id).map(|story| (id, story)))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&selected)?)
    }

    /// Import a payload holding one story object or an id-keyed mapping
    /// of story objects, returning the freshly assigned ids.
    ///
    /// Validation covers the whole payload before anything is inserted: a
    /// single malformed story rejects the entire import and leaves the
    /// vault untouched.
    pub fn import_json(&mut self, payload: &str) -> Result<Vec<StoryId>, ImportError> {
        let value: Value = serde_json::from_str(payload)?;

        let story_violations = match validate_story(&value) {
            Ok(()) => return Ok(vec![self.insert_validated(&value)]),
            Err(violations) => violations,
        };

        // Not a bare story. Treat an object whose members are all objects
        // as the id-keyed mapping form; anything else reports the
        // violations from the story reading, which are the useful ones.
        let mapping = value
            .as_object()
            .filter(|entries| entries.values().all(Value::is_object));
        let Some(entries) = mapping else {
            return Err(reject(story_violations));
        };

        let mut violations = Vec::new();
        for (key, candidate) in entries {
            if let Err(errs) = validate_story(candidate) {
                violations.extend(errs.into_iter().map(|v| v.nested_under(key)));
            }
        }
        if !violations.is_empty() {
            return Err(reject(violations));
        }

        Ok(entries
            .values()
            .map(|candidate| self.insert_validated(candidate))
            .collect())
    }

    /// Import a single story object, returning its freshly assigned id.
    pub fn import_story(&mut self, value: &Value) -> Result<StoryId, ImportError> {
        match validate_story(value) {
            Ok(()) => Ok(self.insert_validated(value)),
            Err(violations) => Err(reject(violations)),
        }
    }

    /// Build a story from a payload that already passed validation and
    /// insert it under a fresh id.
    ///
    /// Top-level fields fill from factory defaults when absent; the
    /// `characters` and `scenes` subtrees are deep-copied verbatim.
    fn insert_validated(&mut self, value: &Value) -> StoryId {
        let draft: StoryDraft = clone_subtree(Some(value));
        let mut story = Story::from_draft(draft);
        story.characters = clone_subtree(value.get("characters"));
        story.scenes = clone_subtree(value.get("scenes"));
        self.insert_story(story)
    }
}

/// Log the rejection on the warning channel and wrap the violations.
fn reject(violations: Vec<SchemaViolation>) -> ImportError {
    tracing::warn!(
        "import rejected: invalid story structure ({} violations)",
        violations.len()
    );
    ImportError::Rejected(ViolationList(violations))
}

/// Deep-copy a validated payload subtree into its typed form.
///
/// The clone keeps the codec from retaining references into
/// caller-supplied data. Validation guarantees the shape, so a mismatch
/// cannot occur here; the fallback keeps this path panic-free anyway.
fn clone_subtree<T: DeserializeOwned + Default>(value: Option<&Value>) -> T {
    value
        .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
        .unwrap_or_default()
}

/// Serialize one story mapping entry the way a full export would.
///
/// Useful for tests and tools that compare story bodies while ignoring
/// the top-level ids.
pub fn story_to_json(story: &Story) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(story)?)
}
