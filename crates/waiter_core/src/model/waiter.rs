//! Waiter domain model.
//!
//! # Responsibility
//! - Define the canonical waiter record and its request payloads.
//! - Provide validation and sparse-merge helpers used by the repository.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another waiter.
//! - `owner_id` is set at creation and never changed by updates.
//! - `name` is non-blank and at most `MAX_FIELD_CHARS` characters.
//! - `description`, when set, is at most `MAX_FIELD_CHARS` characters.

use crate::model::caller::UserId;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned waiter identifier.
pub type WaiterId = i64;

/// Upper bound for textual business fields, in characters.
pub const MAX_FIELD_CHARS: usize = 255;

/// Acknowledgment text returned by a successful delete.
pub const WAITER_DELETED_MESSAGE: &str = "Waiter deleted successfully";

/// Persisted waiter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waiter {
    pub id: WaiterId,
    /// Identity that created the record. Used for authorization.
    pub owner_id: UserId,
    pub name: String,
    pub description: Option<String>,
}

impl Waiter {
    /// Validates business fields before persistence.
    pub fn validate(&self) -> Result<(), WaiterValidationError> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())
    }

    /// Applies only the fields present in `patch`.
    ///
    /// `id` and `owner_id` are untouched since the patch cannot carry them.
    pub fn apply(&mut self, patch: &WaiterUpdate) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

/// Create payload. Unknown keys such as `owner_id` are dropped on
/// deserialization; ownership always comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiterCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl WaiterCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<(), WaiterValidationError> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())
    }
}

/// Sparse update payload.
///
/// `None` leaves a field unchanged. For `description`, `Some(None)` clears it
/// (a JSON `null`), while an absent key keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiterUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl WaiterUpdate {
    /// Returns whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn validate(&self) -> Result<(), WaiterValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description.as_deref())?;
        }
        Ok(())
    }
}

// Maps a present key (including `null`) to `Some(..)`; absent keys hit
// `#[serde(default)]` and stay `None`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One page of visible waiters plus the total size of the visible set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitersPage {
    pub data: Vec<Waiter>,
    pub count: u64,
}

/// Human-readable acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Business field validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaiterValidationError {
    BlankName,
    FieldTooLong { field: &'static str, max_chars: usize },
}

impl Display for WaiterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "waiter name must not be blank"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "waiter {field} exceeds {max_chars} characters")
            }
        }
    }
}

impl Error for WaiterValidationError {}

fn validate_name(name: &str) -> Result<(), WaiterValidationError> {
    if name.trim().is_empty() {
        return Err(WaiterValidationError::BlankName);
    }
    check_length("name", name)
}

fn validate_description(description: Option<&str>) -> Result<(), WaiterValidationError> {
    match description {
        Some(value) => check_length("description", value),
        None => Ok(()),
    }
}

fn check_length(field: &'static str, value: &str) -> Result<(), WaiterValidationError> {
    if value.chars().count() > MAX_FIELD_CHARS {
        return Err(WaiterValidationError::FieldTooLong {
            field,
            max_chars: MAX_FIELD_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Waiter, WaiterCreate, WaiterUpdate, WaiterValidationError, MAX_FIELD_CHARS};
    use uuid::Uuid;

    fn sample() -> Waiter {
        Waiter {
            id: 5,
            owner_id: Uuid::nil(),
            name: "old".to_string(),
            description: Some("keep".to_string()),
        }
    }

    #[test]
    fn apply_changes_only_present_fields() {
        let mut waiter = sample();
        waiter.apply(&WaiterUpdate {
            name: Some("X".to_string()),
            description: None,
        });
        assert_eq!(waiter.name, "X");
        assert_eq!(waiter.description.as_deref(), Some("keep"));
        assert_eq!(waiter.id, 5);
    }

    #[test]
    fn apply_explicit_null_clears_description() {
        let mut waiter = sample();
        waiter.apply(&WaiterUpdate {
            name: None,
            description: Some(None),
        });
        assert_eq!(waiter.name, "old");
        assert_eq!(waiter.description, None);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = WaiterCreate::new("   ").validate().unwrap_err();
        assert_eq!(err, WaiterValidationError::BlankName);
    }

    #[test]
    fn overlong_description_is_rejected() {
        let payload = WaiterCreate::new("ok").with_description("d".repeat(MAX_FIELD_CHARS + 1));
        assert!(matches!(
            payload.validate(),
            Err(WaiterValidationError::FieldTooLong {
                field: "description",
                ..
            })
        ));
    }

    #[test]
    fn update_deserialization_distinguishes_absent_and_null() {
        let absent: WaiterUpdate = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: WaiterUpdate = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));
        assert_eq!(null.name, None);
    }

    #[test]
    fn create_deserialization_drops_owner_fields() {
        let payload: WaiterCreate = serde_json::from_str(
            r#"{"name":"Ana","owner_id":"00000000-0000-4000-8000-000000000009","id":77}"#,
        )
        .unwrap();
        assert_eq!(payload, WaiterCreate::new("Ana"));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(WaiterUpdate::default().is_empty());
    }
}
