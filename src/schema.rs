//! Structural validation for import payloads.
//!
//! A declarative shape tree mirrors the story hierarchy; the walker checks
//! a candidate `serde_json::Value` against it and accumulates
//! path-qualified violations rather than stopping at the first problem.
//! The input is only ever borrowed, never mutated.

use serde_json::Value;
use std::fmt;

/// One structural problem found in a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted path from the payload root, e.g. `scenes.intro.messages`.
    /// Empty for a problem with the root value itself.
    pub path: String,
    /// What was wrong at that path.
    pub reason: String,
}

impl SchemaViolation {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    /// Re-root this violation under an outer key (used when validating
    /// the id-keyed mapping form of a payload).
    pub fn nested_under(mut self, key: &str) -> Self {
        self.path = if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{key}.{}", self.path)
        };
        self
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "{}: {}", self.path, self.reason)
        }
    }
}

/// Expected shape of a value.
enum Shape {
    /// A JSON string.
    Text,
    /// A JSON integer (within i64 range).
    Integer,
    /// A JSON string or null.
    NullableText,
    /// An array whose elements all match the inner shape.
    ListOf(&'static Shape),
    /// An object whose values all match the inner shape; keys are opaque
    /// ids and not themselves validated.
    MapOf(&'static Shape),
    /// An object with the given fields. Unknown extra fields are tolerated.
    Object(&'static [Field]),
}

/// One field of an [`Shape::Object`].
struct Field {
    name: &'static str,
    shape: &'static Shape,
    required: bool,
}

const MESSAGE_SHAPE: Shape = Shape::Object(&[
    Field {
        name: "by",
        shape: &Shape::NullableText,
        required: false,
    },
    Field {
        name: "text",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "createdAt",
        shape: &Shape::Integer,
        required: true,
    },
]);

const CHARACTER_SHAPE: Shape = Shape::Object(&[
    Field {
        name: "name",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "age",
        shape: &Shape::Integer,
        required: true,
    },
    Field {
        name: "gender",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "bio",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "color",
        shape: &Shape::Text,
        required: true,
    },
]);

const SCENE_SHAPE: Shape = Shape::Object(&[
    Field {
        name: "title",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "description",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "characters",
        shape: &Shape::ListOf(&Shape::Text),
        required: true,
    },
    Field {
        name: "messages",
        shape: &Shape::MapOf(&MESSAGE_SHAPE),
        required: true,
    },
]);

const STORY_SHAPE: Shape = Shape::Object(&[
    Field {
        name: "name",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "description",
        shape: &Shape::Text,
        required: true,
    },
    Field {
        name: "cover",
        shape: &Shape::Text,
        required: true,
    },
    // The collections may be absent (import fills them in as empty), but
    // when present they must match the nested shapes.
    Field {
        name: "characters",
        shape: &Shape::MapOf(&CHARACTER_SHAPE),
        required: false,
    },
    Field {
        name: "scenes",
        shape: &Shape::MapOf(&SCENE_SHAPE),
        required: false,
    },
]);

/// Check a candidate story payload against the fixed structural contract.
///
/// Returns every violation found, not just the first.
pub fn validate_story(value: &Value) -> Result<(), Vec<SchemaViolation>> {
    let mut violations = Vec::new();
    check(value, &STORY_SHAPE, "", &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check(value: &Value, shape: &Shape, path: &str, out: &mut Vec<SchemaViolation>) {
    match shape {
        Shape::Text => {
            if !value.is_string() {
                out.push(SchemaViolation::new(
                    path,
                    format!("expected text, found {}", kind(value)),
                ));
            }
        }
        Shape::Integer => {
            if !value.is_i64() {
                out.push(SchemaViolation::new(
                    path,
                    format!("expected integer, found {}", kind(value)),
                ));
            }
        }
        Shape::NullableText => {
            if !value.is_string() && !value.is_null() {
                out.push(SchemaViolation::new(
                    path,
                    format!("expected text or null, found {}", kind(value)),
                ));
            }
        }
        Shape::ListOf(inner) => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    check(item, inner, &join(path, &index.to_string()), out);
                }
            }
            None => out.push(SchemaViolation::new(
                path,
                format!("expected list, found {}", kind(value)),
            )),
        },
        Shape::MapOf(inner) => match value.as_object() {
            Some(entries) => {
                for (key, item) in entries {
                    check(item, inner, &join(path, key), out);
                }
            }
            None => out.push(SchemaViolation::new(
                path,
                format!("expected mapping, found {}", kind(value)),
            )),
        },
        Shape::Object(fields) => match value.as_object() {
            Some(entries) => {
                for field in *fields {
                    match entries.get(field.name) {
                        Some(item) => check(item, field.shape, &join(path, field.name), out),
                        None if field.required => out.push(SchemaViolation::new(
                            &join(path, field.name),
                            "missing required field",
                        )),
                        None => {}
                    }
                }
            }
            None => out.push(SchemaViolation::new(
                path,
                format!("expected object, found {}", kind(value)),
            )),
        },
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

/// Human-readable name of a JSON value's type, for violation messages.
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_story() -> Value {
        json!({
            "name": "Demo",
            "description": "A demo story",
            "cover": "",
            "characters": {
                "c1": {
                    "name": "Ann",
                    "age": 27,
                    "gender": "F",
                    "bio": "",
                    "color": "#FF0000"
                }
            },
            "scenes": {
                "s1": {
                    "title": "Intro",
                    "description": "",
                    "characters": ["c1"],
                    "messages": {
                        "m1": { "by": "c1", "text": "Hello", "createdAt": 1700000000000_i64 }
                    }
                }
            }
        })
    }

    #[test]
    fn test_accepts_full_story() {
        assert!(validate_story(&valid_story()).is_ok());
    }

    #[test]
    fn test_accepts_minimal_story() {
        let minimal = json!({ "name": "Bare", "description": "", "cover": "" });
        assert!(validate_story(&minimal).is_ok());
    }

    #[test]
    fn test_accepts_narrator_message() {
        let mut story = valid_story();
        story["scenes"]["s1"]["messages"]["m1"]["by"] = Value::Null;
        assert!(validate_story(&story).is_ok());

        // Absent `by` means narrator too.
        story["scenes"]["s1"]["messages"]["m1"]
            .as_object_mut()
            .unwrap()
            .remove("by");
        assert!(validate_story(&story).is_ok());
    }

    #[test]
    fn test_tolerates_unknown_fields() {
        let mut story = valid_story();
        story["favorite"] = json!(true);
        assert!(validate_story(&story).is_ok());
    }

    #[test]
    fn test_rejects_non_object_root() {
        let violations = validate_story(&json!("just text")).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "");
        assert!(violations[0].reason.contains("expected object"));
    }

    #[test]
    fn test_rejects_missing_required_field() {
        let story = json!({ "name": "No description", "cover": "" });
        let violations = validate_story(&story).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "description");
        assert_eq!(violations[0].reason, "missing required field");
    }

    #[test]
    fn test_rejects_scene_without_messages() {
        let mut story = valid_story();
        story["scenes"]["s1"]
            .as_object_mut()
            .unwrap()
            .remove("messages");
        let violations = validate_story(&story).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "scenes.s1.messages");
    }

    #[test]
    fn test_rejects_wrong_types_with_paths() {
        let mut story = valid_story();
        story["characters"]["c1"]["age"] = json!("old");
        story["scenes"]["s1"]["characters"] = json!("c1");
        let violations = validate_story(&story).unwrap_err();

        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"characters.c1.age"));
        assert!(paths.contains(&"scenes.s1.characters"));
    }

    #[test]
    fn test_rejects_fractional_age() {
        let mut story = valid_story();
        story["characters"]["c1"]["age"] = json!(10.5);
        let violations = validate_story(&story).unwrap_err();
        assert_eq!(violations[0].path, "characters.c1.age");
        assert!(violations[0].reason.contains("expected integer"));
    }

    #[test]
    fn test_collects_multiple_violations() {
        let story = json!({ "name": 3, "description": [], "cover": "" });
        let violations = validate_story(&story).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_list_violation_reports_index() {
        let mut story = valid_story();
        story["scenes"]["s1"]["characters"] = json!(["c1", 7]);
        let violations = validate_story(&story).unwrap_err();
        assert_eq!(violations[0].path, "scenes.s1.characters.1");
    }

    #[test]
    fn test_violation_display() {
        let violation = SchemaViolation::new("scenes.s1.title", "missing required field");
        assert_eq!(
            violation.to_string(),
            "scenes.s1.title: missing required field"
        );
    }

    #[test]
    fn test_nested_under_reroots_path() {
        let violation = SchemaViolation::new("name", "expected text, found number");
        let nested = violation.nested_under("abc");
        assert_eq!(nested.path, "abc.name");

        let root = SchemaViolation::new("", "expected object, found list");
        assert_eq!(root.nested_under("abc").path, "abc");
    }
}
