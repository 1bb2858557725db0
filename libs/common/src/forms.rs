//! Field-level validation messages shared by every form

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Mapping from form field name to a human-readable message
///
/// A form may only be submitted while this is empty. Editing a field clears
/// that field's message without re-validating the rest of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, keeping the first one reported
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Drop the message of a single field
    pub fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok` when no message is present, so callers can use `?`
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for FormErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FormErrors::new();
        errors.add("date", "Date is required");
        errors.add("date", "Date must be a valid calendar date");
        assert_eq!(errors.get("date"), Some("Date is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn clearing_one_field_keeps_the_others() {
        let mut errors = FormErrors::new();
        errors.add("title", "Title is required");
        errors.add("media", "Media file is required");
        errors.clear("title");
        assert!(!errors.contains("title"));
        assert!(errors.contains("media"));
        assert!(errors.clone().into_result().is_err());

        errors.clear("media");
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn serializes_as_plain_map() {
        let mut errors = FormErrors::new();
        errors.add("owner", "Owner is required");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"owner": "Owner is required"}));
        assert_eq!(errors.to_string(), "owner: Owner is required");
    }
}
