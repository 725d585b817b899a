//! The `User` entity and its request payloads.
//!
//! JSON field names are camelCase so the static admin client can consume
//! the API responses directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

/// Upper bound accepted for [`User::age`].
pub const AGE_MAX: i32 = 150;

/// A persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database-assigned identifier.
    pub id: i32,
    /// Display name.
    pub nickname: String,
    /// Contact email, unique across users.
    pub email: String,
    /// Optional age in years.
    pub age: Option<i32>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
    /// When the row was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /user`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateUser {
    /// Display name.
    #[validate(length(min = 1, max = 64, message = "nickname must be 1-64 characters"))]
    pub nickname: String,
    /// Contact email.
    #[validate(
        email(message = "email must be a valid email address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    pub email: String,
    /// Optional age in years.
    #[validate(range(min = 0, max = 150, message = "age must be between 0 and 150"))]
    #[serde(default)]
    pub age: Option<i32>,
}

impl CreateUser {
    /// Trim surrounding whitespace from the text fields.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            nickname: self.nickname.trim().to_owned(),
            email: self.email.trim().to_owned(),
            age: self.age,
        }
    }
}

/// Payload for `PATCH /user/{id}`. Absent fields are left unchanged;
/// `"age": null` clears the age.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateUser {
    /// New display name.
    #[validate(length(min = 1, max = 64, message = "nickname must be 1-64 characters"))]
    #[serde(default)]
    pub nickname: Option<String>,
    /// New contact email.
    #[validate(
        email(message = "email must be a valid email address"),
        length(max = 255, message = "email must be at most 255 characters")
    )]
    #[serde(default)]
    pub email: Option<String>,
    /// `None` leaves the age alone, `Some(None)` clears it.
    #[validate(range(min = 0, max = 150, message = "age must be between 0 and 150"))]
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<i32>>,
}

/// Maps a field that is present in the JSON to `Some`, even when it is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateUser {
    /// Trim surrounding whitespace from the text fields that are present.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            nickname: self.nickname.map(|n| n.trim().to_owned()),
            email: self.email.map(|e| e.trim().to_owned()),
            age: self.age,
        }
    }

    /// Whether the payload changes nothing.
    pub const fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.email.is_none() && self.age.is_none()
    }
}

/// Flatten validation errors into a single `"; "`-joined message.
///
/// Fields are sorted by name so the output is stable.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    for (field, errs) in fields {
        for err in errs {
            match &err.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{field} is invalid ({})", err.code)),
            }
        }
    }
    messages.join("; ")
}
