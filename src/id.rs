//! Typed identifiers for the story hierarchy.
//!
//! Uses the newtype pattern to prevent mixing up different ID kinds at
//! compile time. Generated ids are canonical v4 UUID strings; ids arriving
//! through import are kept verbatim, so the inner representation is the
//! opaque string rather than a parsed UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around an opaque id string.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a new random id.
            ///
            /// 128 random bits formatted as a canonical hyphenated v4 UUID
            /// string. Collisions are treated as negligible and never
            /// checked against existing ids.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// View the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a story
    StoryId
);

define_id!(
    /// Unique identifier for a character within a story
    CharacterId
);

define_id!(
    /// Unique identifier for a scene within a story
    SceneId
);

define_id!(
    /// Unique identifier for a message within a scene
    MessageId
);
