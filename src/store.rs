//! The story vault: the single in-memory tree of authored content.
//!
//! All CRUD goes through an explicit [`StoryVault`] instance owned by the
//! application's composition root; there is no ambient global state. Every
//! successful mutation mirrors the whole tree to the snapshot file before
//! returning, best-effort: a failed write is logged and the in-memory
//! state stands.
//!
//! Missing-parent and missing-target on update/delete are silent no-ops,
//! never errors. Callers that want existence feedback query first.

use crate::id::{CharacterId, MessageId, SceneId, StoryId};
use crate::model::{
    Character, CharacterDraft, Message, MessageDraft, Scene, SceneDraft, Story, StoryDraft,
    StorySummary,
};
use crate::snapshot::SnapshotStore;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// The id-keyed story mapping, which is also the whole persisted state.
pub type StoryMap = BTreeMap<StoryId, Story>;

/// The single source of truth for authored content.
#[derive(Debug, Default)]
pub struct StoryVault {
    stories: StoryMap,
    snapshot: Option<SnapshotStore>,
    /// Last assigned message timestamp, so `created_at` never goes
    /// backwards within one vault even if the wall clock does.
    clock: i64,
}

impl StoryVault {
    /// Create an empty in-memory vault with no durable backing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a vault mirrored to a snapshot file.
    ///
    /// A missing file starts empty. An unreadable or corrupt snapshot is
    /// logged and also starts empty rather than failing startup; the bad
    /// file is left in place until the first mutation overwrites it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let snapshot = SnapshotStore::at(path);
        let stories = match snapshot.load() {
            Ok(Some(stories)) => stories,
            Ok(None) => StoryMap::new(),
            Err(err) => {
                tracing::warn!(
                    "failed to restore snapshot from {}, starting empty: {err}",
                    snapshot.path().display()
                );
                StoryMap::new()
            }
        };
        let clock = stories.values().map(Story::latest_message_at).max().unwrap_or(0);
        Self {
            stories,
            snapshot: Some(snapshot),
            clock,
        }
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Create a story from the draft and return its id. Always succeeds.
    pub fn create_story(&mut self, draft: StoryDraft) -> StoryId {
        let id = StoryId::generate();
        self.stories.insert(id.clone(), Story::from_draft(draft));
        self.sync();
        id
    }

    /// Merge the supplied fields into the story; no-op if absent.
    pub fn update_story(&mut self, id: &StoryId, draft: StoryDraft) {
        if let Some(story) = self.stories.get_mut(id) {
            story.merge(draft);
            self.sync();
        }
    }

    /// Remove the story and everything it owns; no-op if absent.
    pub fn delete_story(&mut self, id: &StoryId) {
        if self.stories.remove(id).is_some() {
            self.sync();
        }
    }

    // =========================================================================
    // Characters
    // =========================================================================

    /// Create a character under the story and return its id, or `None`
    /// with no mutation when the story does not resolve.
    pub fn create_character(
        &mut self,
        story_id: &StoryId,
        draft: CharacterDraft,
    ) -> Option<CharacterId> {
        let story = self.stories.get_mut(story_id)?;
        let id = CharacterId::generate();
        story
            .characters
            .insert(id.clone(), Character::from_draft(draft));
        self.sync();
        Some(id)
    }

    /// Merge the supplied fields into the character; no-op if absent.
    pub fn update_character(
        &mut self,
        story_id: &StoryId,
        id: &CharacterId,
        draft: CharacterDraft,
    ) {
        if let Some(character) = self
            .stories
            .get_mut(story_id)
            .and_then(|story| story.characters.get_mut(id))
        {
            character.merge(draft);
            self.sync();
        }
    }

    /// Remove the character; no-op if absent. Scene references to the id
    /// are left as-is and read as dangling.
    pub fn delete_character(&mut self, story_id: &StoryId, id: &CharacterId) {
        let removed = self
            .stories
            .get_mut(story_id)
            .map(|story| story.characters.remove(id).is_some());
        if removed == Some(true) {
            self.sync();
        }
    }

    // =========================================================================
    // Scenes
    // =========================================================================

    /// Create a scene under the story and return its id, or `None` with
    /// no mutation when the story does not resolve.
    pub fn create_scene(&mut self, story_id: &StoryId, draft: SceneDraft) -> Option<SceneId> {
        let story = self.stories.get_mut(story_id)?;
        let id = SceneId::generate();
        story.scenes.insert(id.clone(), Scene::from_draft(draft));
        self.sync();
        Some(id)
    }

    /// Merge the supplied fields into the scene; no-op if absent.
    pub fn update_scene(&mut self, story_id: &StoryId, id: &SceneId, draft: SceneDraft) {
        if let Some(scene) = self
            .stories
            .get_mut(story_id)
            .and_then(|story| story.scenes.get_mut(id))
        {
            scene.merge(draft);
            self.sync();
        }
    }

    /// Remove the scene and every message it owns; no-op if absent.
    pub fn delete_scene(&mut self, story_id: &StoryId, id: &SceneId) {
        let removed = self
            .stories
            .get_mut(story_id)
            .map(|story| story.scenes.remove(id).is_some());
        if removed == Some(true) {
            self.sync();
        }
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Append a message to the scene and return its id, or `None` with no
    /// mutation when the story or scene does not resolve.
    ///
    /// `created_at` is stamped from the vault clock: wall time, clamped to
    /// be strictly greater than the previous stamp.
    pub fn add_message(
        &mut self,
        story_id: &StoryId,
        scene_id: &SceneId,
        draft: MessageDraft,
    ) -> Option<MessageId> {
        let scene = self
            .stories
            .get_mut(story_id)?
            .scenes
            .get_mut(scene_id)?;
        self.clock = now_millis().max(self.clock + 1);
        let id = MessageId::generate();
        scene
            .messages
            .insert(id.clone(), Message::from_draft(draft, self.clock));
        self.sync();
        Some(id)
    }

    /// Merge the supplied fields into the message; no-op if absent.
    /// `created_at` is never touched.
    pub fn update_message(
        &mut self,
        story_id: &StoryId,
        scene_id: &SceneId,
        id: &MessageId,
        draft: MessageDraft,
    ) {
        if let Some(message) = self
            .stories
            .get_mut(story_id)
            .and_then(|story| story.scenes.get_mut(scene_id))
            .and_then(|scene| scene.messages.get_mut(id))
        {
            message.merge(draft);
            self.sync();
        }
    }

    /// Remove the message; no-op if absent.
    pub fn delete_message(&mut self, story_id: &StoryId, scene_id: &SceneId, id: &MessageId) {
        let removed = self
            .stories
            .get_mut(story_id)
            .and_then(|story| story.scenes.get_mut(scene_id))
            .map(|scene| scene.messages.remove(id).is_some());
        if removed == Some(true) {
            self.sync();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every story as id plus summary fields, without nested content.
    pub fn stories(&self) -> Vec<StorySummary> {
        self.stories
            .iter()
            .map(|(id, story)| story.summary(id))
            .collect()
    }

    /// Fetch a story, or `None` if the id does not resolve.
    pub fn story(&self, id: &StoryId) -> Option<&Story> {
        self.stories.get(id)
    }

    /// Fetch a character by id path, or `None` if any segment is absent.
    pub fn character(&self, story_id: &StoryId, id: &CharacterId) -> Option<&Character> {
        self.stories.get(story_id)?.characters.get(id)
    }

    /// Fetch a scene by id path, or `None` if any segment is absent.
    pub fn scene(&self, story_id: &StoryId, id: &SceneId) -> Option<&Scene> {
        self.stories.get(story_id)?.scenes.get(id)
    }

    /// Fetch a message by id path, or `None` if any segment is absent.
    pub fn message(
        &self,
        story_id: &StoryId,
        scene_id: &SceneId,
        id: &MessageId,
    ) -> Option<&Message> {
        self.stories
            .get(story_id)?
            .scenes
            .get(scene_id)?
            .messages
            .get(id)
    }

    /// Number of stories in the vault.
    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    /// Drop every story.
    pub fn clear(&mut self) {
        if !self.stories.is_empty() {
            self.stories.clear();
            self.sync();
        }
    }

    // =========================================================================
    // Internals shared with the codec
    // =========================================================================

    /// The full id-keyed mapping, for export and snapshot serialization.
    pub(crate) fn stories_map(&self) -> &StoryMap {
        &self.stories
    }

    /// Insert an already-validated story under a fresh id (import path).
    pub(crate) fn insert_story(&mut self, story: Story) -> StoryId {
        self.clock = self.clock.max(story.latest_message_at());
        let id = StoryId::generate();
        self.stories.insert(id.clone(), story);
        self.sync();
        id
    }

    /// Mirror the current state to the snapshot file, best-effort.
    fn sync(&self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(err) = snapshot.save(&self.stories) {
                tracing::warn!(
                    "failed to write snapshot to {}, in-memory state stands: {err}",
                    snapshot.path().display()
                );
            }
        }
    }
}

/// Current wall time in milliseconds since the epoch.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
