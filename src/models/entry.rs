use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Distinguishes an absent field from an explicit `null`: absent stays
/// `None` via `#[serde(default)]`, while any present value (including null)
/// becomes `Some(..)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub title: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /entries
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEntryRequest {
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: i32,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    pub body: Option<String>,
}

/// PATCH /entries/{id} — absent fields are left untouched. `body` is the
/// one nullable column, so it distinguishes absent (untouched) from an
/// explicit `null` (cleared).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: Option<i32>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub body: Option<Option<String>>,
}

/// List response: the caller's entries plus the total count.
#[derive(Debug, Serialize)]
pub struct EntryList {
    pub data: Vec<Entry>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(mood: i32, title: &str) -> CreateEntryRequest {
        CreateEntryRequest {
            mood,
            title: title.into(),
            body: None,
        }
    }

    #[test]
    fn test_mood_bounds() {
        assert!(create(1, "Good day").validate().is_ok());
        assert!(create(10, "Good day").validate().is_ok());
        assert!(create(0, "Good day").validate().is_err());
        assert!(create(11, "Good day").validate().is_err());
    }

    #[test]
    fn test_title_bounds() {
        assert!(create(5, "").validate().is_err());
        assert!(create(5, &"x".repeat(255)).validate().is_ok());
        assert!(create(5, &"x".repeat(256)).validate().is_err());
    }

    #[test]
    fn test_body_optional() {
        let req = CreateEntryRequest {
            mood: 7,
            title: "Good day".into(),
            body: Some("Long walk in the sun".into()),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_partial() {
        let req = UpdateEntryRequest {
            mood: None,
            title: None,
            body: None,
        };
        assert!(req.validate().is_ok());

        let req = UpdateEntryRequest {
            mood: Some(11),
            title: None,
            body: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_body_absent_vs_null_vs_set() {
        let absent: UpdateEntryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.body, None);

        let cleared: UpdateEntryRequest = serde_json::from_str(r#"{"body": null}"#).unwrap();
        assert_eq!(cleared.body, Some(None));

        let set: UpdateEntryRequest = serde_json::from_str(r#"{"body": "better now"}"#).unwrap();
        assert_eq!(set.body, Some(Some("better now".into())));
    }
}
