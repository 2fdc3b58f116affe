use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Input fields that can carry validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    BankId,
    QuestionText,
    Options,
    CorrectIndices,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::BankId => "bankId",
            Field::QuestionText => "questionText",
            Field::Options => "options",
            Field::CorrectIndices => "correctIndices",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured field-error map returned by validation instead of a single error.
///
/// Serializes as `{ "questionText": ["..."], "options": ["...", "..."] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map holding one message for one field.
    #[must_use]
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Messages recorded for `field`, empty when the field is valid.
    #[must_use]
    pub fn get(&self, field: Field) -> &[String] {
        self.0.get(&field).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &[String])> {
        self.0.iter().map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.push(Field::Options, "a");
        errors.push(Field::Options, "b");
        errors.push(Field::QuestionText, "c");

        assert_eq!(errors.get(Field::Options), ["a", "b"]);
        assert_eq!(errors.get(Field::CorrectIndices), [] as [String; 0]);
        assert_eq!(errors.to_string(), "questionText: c; options: a; options: b");
    }

    #[test]
    fn serializes_as_camel_case_map() {
        let errors = FieldErrors::single(Field::CorrectIndices, "pick one");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"correctIndices":["pick one"]}"#);
    }
}
