//! Persistent data layer for a single-user story authoring tool.
//!
//! This crate provides:
//! - A hierarchical entity store: stories owning characters and scenes,
//!   scenes owning messages
//! - Schema-validated import and deterministic, diffable export
//! - Whole-state snapshot persistence across process restarts
//!
//! The vault is an explicit instance owned by the application's
//! composition root. Everything above it (views, navigation, theming) is
//! an external collaborator that calls these operations and reads the
//! query results.
//!
//! # Quick Start
//!
//! ```
//! use storyweave_core::{CharacterDraft, MessageDraft, SceneDraft, StoryDraft, StoryVault};
//!
//! let mut vault = StoryVault::new();
//!
//! let story = vault.create_story(StoryDraft::new().with_name("Demo"));
//! let ann = vault
//!     .create_character(&story, CharacterDraft::new().with_name("Ann"))
//!     .unwrap();
//! let intro = vault
//!     .create_scene(&story, SceneDraft::new().with_title("Intro"))
//!     .unwrap();
//! vault
//!     .add_message(&story, &intro, MessageDraft::new().with_by(ann).with_text("Hello"))
//!     .unwrap();
//!
//! // Round-trip through the portable form: the copy gets a fresh id.
//! let export = vault.export_json(Some(&[story.clone()])).unwrap();
//! let imported = vault.import_json(&export).unwrap();
//! assert_ne!(imported[0], story);
//! assert_eq!(vault.story_count(), 2);
//! ```
//!
//! For durability, open the vault on a snapshot path instead:
//!
//! ```no_run
//! use storyweave_core::{default_snapshot_path, StoryVault};
//!
//! let vault = StoryVault::open(default_snapshot_path("./data"));
//! assert_eq!(vault.story_count(), 0);
//! ```

pub mod codec;
pub mod id;
pub mod model;
pub mod schema;
pub mod snapshot;
pub mod store;

// Primary public API
pub use codec::{story_to_json, ExportError, ImportError};
pub use id::{CharacterId, MessageId, SceneId, StoryId};
pub use model::{
    Character, CharacterDraft, Message, MessageDraft, Scene, SceneDraft, Story, StoryDraft,
    StorySummary,
};
pub use schema::{validate_story, SchemaViolation};
pub use snapshot::{default_snapshot_path, SnapshotError, SnapshotStore};
pub use store::{StoryMap, StoryVault};
