//! Entity types for the story hierarchy.
//!
//! A `Story` exclusively owns its characters and scenes, and a `Scene`
//! exclusively owns its messages; a scene's `characters` list holds
//! references into the owning story's character collection, not ownership.
//! Entities are created by merging a draft over documented defaults and
//! updated by shallow-merging only the fields the draft supplies.

use crate::id::{CharacterId, MessageId, SceneId, StoryId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Entities
// ============================================================================

/// A top-level authored work, root of one ownership subtree.
///
/// Stories do not carry their own id; they are keyed by `StoryId` in the
/// vault's mapping, and that mapping is also the export and snapshot form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Cover image reference.
    pub cover: String,
    /// Characters owned by this story.
    pub characters: BTreeMap<CharacterId, Character>,
    /// Scenes owned by this story.
    pub scenes: BTreeMap<SceneId, Scene>,
}

impl Story {
    /// Build a story from a draft, filling unset fields with defaults.
    pub fn from_draft(draft: StoryDraft) -> Self {
        Self {
            name: draft.name.unwrap_or_else(|| "New story".to_owned()),
            description: draft.description.unwrap_or_default(),
            cover: draft.cover.unwrap_or_default(),
            characters: BTreeMap::new(),
            scenes: BTreeMap::new(),
        }
    }

    /// Shallow-merge the supplied fields; unset fields keep their values.
    pub fn merge(&mut self, draft: StoryDraft) {
        if let Some(name) = draft.name {
            self.name = name;
        }
        if let Some(description) = draft.description {
            self.description = description;
        }
        if let Some(cover) = draft.cover {
            self.cover = cover;
        }
    }

    /// Summary form used by list queries.
    pub fn summary(&self, id: &StoryId) -> StorySummary {
        StorySummary {
            id: id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Largest message timestamp anywhere in this story, 0 when empty.
    pub fn latest_message_at(&self) -> i64 {
        self.scenes
            .values()
            .flat_map(|scene| scene.messages.values())
            .map(|message| message.created_at)
            .max()
            .unwrap_or(0)
    }
}

/// A named actor belonging to one story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub age: i64,
    /// Short gender code, e.g. "M" or "F".
    pub gender: String,
    pub bio: String,
    /// Display color as a CSS hex value.
    pub color: String,
}

impl Character {
    /// Build a character from a draft, filling unset fields with defaults.
    pub fn from_draft(draft: CharacterDraft) -> Self {
        Self {
            name: draft.name.unwrap_or_else(|| "Simple Name".to_owned()),
            age: draft.age.unwrap_or(10),
            gender: draft.gender.unwrap_or_else(|| "M".to_owned()),
            bio: draft.bio.unwrap_or_default(),
            color: draft.color.unwrap_or_else(|| "#9CA3AF".to_owned()),
        }
    }

    /// Shallow-merge the supplied fields; unset fields keep their values.
    pub fn merge(&mut self, draft: CharacterDraft) {
        if let Some(name) = draft.name {
            self.name = name;
        }
        if let Some(age) = draft.age {
            self.age = age;
        }
        if let Some(gender) = draft.gender {
            self.gender = gender;
        }
        if let Some(bio) = draft.bio {
            self.bio = bio;
        }
        if let Some(color) = draft.color {
            self.color = color;
        }
    }
}

/// A narrative unit belonging to one story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub title: String,
    pub description: String,
    /// Participating characters, by reference into the owning story.
    /// A listed id is expected to exist in the story's character
    /// collection but this is not structurally enforced; a dangling
    /// reference reads as an absent character.
    pub characters: Vec<CharacterId>,
    /// Messages owned by this scene.
    pub messages: BTreeMap<MessageId, Message>,
}

impl Scene {
    /// Build a scene from a draft, filling unset fields with defaults.
    pub fn from_draft(draft: SceneDraft) -> Self {
        Self {
            title: draft.title.unwrap_or_else(|| "New scene".to_owned()),
            description: draft.description.unwrap_or_default(),
            characters: draft.characters.unwrap_or_default(),
            messages: BTreeMap::new(),
        }
    }

    /// Shallow-merge the supplied fields; unset fields keep their values.
    pub fn merge(&mut self, draft: SceneDraft) {
        if let Some(title) = draft.title {
            self.title = title;
        }
        if let Some(description) = draft.description {
            self.description = description;
        }
        if let Some(characters) = draft.characters {
            self.characters = characters;
        }
    }

    /// Messages in chronological order.
    ///
    /// The backing map is keyed by id, so readers that want the authored
    /// sequence sort by `created_at`.
    pub fn messages_by_time(&self) -> Vec<(&MessageId, &Message)> {
        let mut messages: Vec<_> = self.messages.iter().collect();
        messages.sort_by_key(|(_, message)| message.created_at);
        messages
    }
}

/// One authored line within a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Speaking character, or `None` for narrator/system lines.
    pub by: Option<CharacterId>,
    pub text: String,
    /// Milliseconds since the epoch, assigned once at creation by the
    /// vault's non-decreasing clock and never mutated afterwards.
    pub created_at: i64,
}

impl Message {
    /// Build a message from a draft with the given creation timestamp.
    pub fn from_draft(draft: MessageDraft, created_at: i64) -> Self {
        Self {
            by: draft.by.unwrap_or(None),
            text: draft.text.unwrap_or_default(),
            created_at,
        }
    }

    /// Shallow-merge the supplied fields; `created_at` is immutable.
    pub fn merge(&mut self, draft: MessageDraft) {
        if let Some(by) = draft.by {
            self.by = by;
        }
        if let Some(text) = draft.text {
            self.text = text;
        }
    }
}

/// Identity plus headline fields for story list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorySummary {
    pub id: StoryId,
    pub name: String,
    pub description: String,
}

// ============================================================================
// Drafts
// ============================================================================

/// Fields accepted when creating or updating a story.
///
/// Every field is optional: on create, unset fields fall back to defaults;
/// on update, unset fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
}

impl StoryDraft {
    /// Empty draft; create with pure defaults, update as a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the cover reference.
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }
}

/// Fields accepted when creating or updating a character.
#[derive(Debug, Clone, Default)]
pub struct CharacterDraft {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub bio: Option<String>,
    pub color: Option<String>,
}

impl CharacterDraft {
    /// Empty draft; create with pure defaults, update as a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the age.
    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    /// Set the gender code.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Set the bio.
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Fields accepted when creating or updating a scene.
#[derive(Debug, Clone, Default)]
pub struct SceneDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub characters: Option<Vec<CharacterId>>,
}

impl SceneDraft {
    /// Empty draft; create with pure defaults, update as a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the participating character references.
    pub fn with_characters(mut self, characters: Vec<CharacterId>) -> Self {
        self.characters = Some(characters);
        self
    }
}

/// Fields accepted when creating or updating a message.
///
/// `by` is doubly optional so an update can distinguish "leave the
/// attribution alone" (`None`) from "clear it to narrator"
/// (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct MessageDraft {
    pub by: Option<Option<CharacterId>>,
    pub text: Option<String>,
}

impl MessageDraft {
    /// Empty draft; create with pure defaults, update as a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute the message to a character.
    pub fn with_by(mut self, by: CharacterId) -> Self {
        self.by = Some(Some(by));
        self
    }

    /// Clear attribution back to narrator.
    pub fn unattributed(mut self) -> Self {
        self.by = Some(None);
        self
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_defaults() {
        let story = Story::from_draft(StoryDraft::new());
        assert_eq!(story.name, "New story");
        assert_eq!(story.description, "");
        assert_eq!(story.cover, "");
        assert!(story.characters.is_empty());
        assert!(story.scenes.is_empty());
    }

    #[test]
    fn test_character_defaults() {
        let character = Character::from_draft(CharacterDraft::new());
        assert_eq!(character.name, "Simple Name");
        assert_eq!(character.age, 10);
        assert_eq!(character.gender, "M");
        assert_eq!(character.bio, "");
        assert_eq!(character.color, "#9CA3AF");
    }

    #[test]
    fn test_scene_defaults() {
        let scene = Scene::from_draft(SceneDraft::new());
        assert_eq!(scene.title, "New scene");
        assert_eq!(scene.description, "");
        assert!(scene.characters.is_empty());
        assert!(scene.messages.is_empty());
    }

    #[test]
    fn test_message_defaults() {
        let message = Message::from_draft(MessageDraft::new(), 42);
        assert_eq!(message.by, None);
        assert_eq!(message.text, "");
        assert_eq!(message.created_at, 42);
    }

    #[test]
    fn test_draft_overrides_defaults() {
        let story = Story::from_draft(
            StoryDraft::new()
                .with_name("The Long Night")
                .with_cover("cover.png"),
        );
        assert_eq!(story.name, "The Long Night");
        assert_eq!(story.description, "");
        assert_eq!(story.cover, "cover.png");
    }

    #[test]
    fn test_merge_touches_only_supplied_fields() {
        let mut character = Character::from_draft(
            CharacterDraft::new().with_name("Ann").with_age(27),
        );
        character.merge(CharacterDraft::new().with_bio("A quiet archivist."));

        assert_eq!(character.name, "Ann");
        assert_eq!(character.age, 27);
        assert_eq!(character.bio, "A quiet archivist.");
        assert_eq!(character.gender, "M");
    }

    #[test]
    fn test_message_merge_keeps_attribution_when_unset() {
        let ann = CharacterId::generate();
        let mut message =
            Message::from_draft(MessageDraft::new().with_by(ann.clone()), 1);

        message.merge(MessageDraft::new().with_text("Hello"));
        assert_eq!(message.by, Some(ann));
        assert_eq!(message.text, "Hello");
    }

    #[test]
    fn test_message_merge_clears_attribution_explicitly() {
        let mut message = Message::from_draft(
            MessageDraft::new().with_by(CharacterId::generate()),
            1,
        );

        message.merge(MessageDraft::new().unattributed());
        assert_eq!(message.by, None);
    }

    #[test]
    fn test_message_merge_never_touches_created_at() {
        let mut message = Message::from_draft(MessageDraft::new(), 7);
        message.merge(MessageDraft::new().with_text("edited"));
        assert_eq!(message.created_at, 7);
    }

    #[test]
    fn test_message_serde_uses_camel_case() {
        let message = Message {
            by: None,
            text: "Hi".to_owned(),
            created_at: 1700000000000,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["createdAt"], 1700000000000_i64);
        assert!(json["by"].is_null());
    }

    #[test]
    fn test_messages_by_time_sorts_chronologically() {
        let mut scene = Scene::from_draft(SceneDraft::new());
        // Insert with ids whose sort order disagrees with creation order.
        scene.messages.insert(
            MessageId::from("zzz"),
            Message::from_draft(MessageDraft::new().with_text("first"), 1),
        );
        scene.messages.insert(
            MessageId::from("aaa"),
            Message::from_draft(MessageDraft::new().with_text("second"), 2),
        );

        let ordered = scene.messages_by_time();
        assert_eq!(ordered[0].1.text, "first");
        assert_eq!(ordered[1].1.text, "second");
    }
}
