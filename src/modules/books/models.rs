use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// A catalog entry, serialized as exactly `id`, `name`, `description`,
/// `publisher` (the owning user's id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Unique identifier for the book
    pub id: i64,
    /// Title of the book
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Id of the user that owns the book
    #[sqlx(rename = "publisher_id")]
    pub publisher: i64,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Full representation accepted by `POST` and `PUT`; every field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BookInput {
    #[validate(
        required(message = "This field is required."),
        custom(function = "libris_http::validation::not_blank"),
        length(max = 64, message = "Ensure this field has no more than 64 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "libris_http::validation::not_blank")
    )]
    pub description: Option<String>,
    #[validate(required(message = "This field is required."))]
    pub publisher: Option<i64>,
}

impl BookInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>, publisher: i64) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            publisher: Some(publisher),
        }
    }
}

/// Partial update. An absent field keeps its stored value; an explicit
/// `null` is rejected like on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookChanges {
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        with = "::serde_with::rust::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub publisher: Option<Option<i64>>,
}

impl BookChanges {
    pub fn supplies_publisher(&self) -> bool {
        matches!(self.publisher, Some(Some(_)))
    }

    /// Overlay the supplied fields on `current`. The result still has to be
    /// validated; fields sent as `null` are reported here.
    pub fn apply_to(&self, current: &Book) -> Result<BookInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let merged = BookInput {
            name: overlay(&mut errors, "name", &self.name, &current.name),
            description: overlay(&mut errors, "description", &self.description, &current.description),
            publisher: overlay(&mut errors, "publisher", &self.publisher, &current.publisher),
        };

        if errors.is_empty() {
            Ok(merged)
        } else {
            Err(errors)
        }
    }
}

fn overlay<T: Clone>(
    errors: &mut ValidationErrors,
    field: &'static str,
    change: &Option<Option<T>>,
    current: &T,
) -> Option<T> {
    match change {
        None => Some(current.clone()),
        Some(Some(value)) => Some(value.clone()),
        Some(None) => {
            errors.add(field, libris_http::validation::not_null());
            None
        }
    }
}

impl From<BookInput> for BookChanges {
    fn from(input: BookInput) -> Self {
        Self {
            name: input.name.map(Some),
            description: input.description.map(Some),
            publisher: input.publisher.map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 1,
            name: "Dune".to_string(),
            description: "Spice".to_string(),
            publisher: 1,
        }
    }

    #[test]
    fn absent_and_null_fields_deserialize_differently() {
        let changes: BookChanges = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(changes.name, Some(None));
        assert_eq!(changes.description, None);
        assert_eq!(changes.publisher, None);
    }

    #[test]
    fn overlay_keeps_absent_fields() {
        let changes: BookChanges =
            serde_json::from_str(r#"{"description": "Desert planet"}"#).unwrap();
        let merged = changes.apply_to(&dune()).unwrap();
        assert_eq!(merged.name.as_deref(), Some("Dune"));
        assert_eq!(merged.description.as_deref(), Some("Desert planet"));
        assert_eq!(merged.publisher, Some(1));
    }

    #[test]
    fn null_fields_are_field_errors() {
        let changes: BookChanges =
            serde_json::from_str(r#"{"name": null, "publisher": null}"#).unwrap();
        let errors = changes.apply_to(&dune()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("publisher"));
        assert!(!fields.contains_key("description"));
    }
}
