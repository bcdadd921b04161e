//! Contact form draft and the client-side gate in front of submission.

pub mod status;

pub use status::{BannerKind, Rejected, SubmitFlow};

use serde::{Deserialize, Serialize};

/// Shown for every validation failure, whichever field is missing
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";

/// One contact submission. Serialized as the JSON request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
        }
    }

    /// True when every field is the empty string
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    /// Tab order
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::Subject, Field::Message];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Subject => "Subject",
            Field::Message => "Message",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "John Doe",
            Field::Email => "john@example.com",
            Field::Subject => "Project Inquiry",
            Field::Message => "Tell me about your project...",
        }
    }

    /// Only the message body takes newlines
    pub fn is_multiline(self) -> bool {
        self == Field::Message
    }
}

/// Holds the in-progress draft. A plain data sink: no validation here.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    draft: ContactMessage,
}

impl ContactForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ContactMessage {
        &self.draft
    }

    /// Replace one field's value, leaving the others untouched
    pub fn update(&mut self, field: Field, value: impl Into<String>) {
        *self.draft.slot_mut(field) = value.into();
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        let mut value = self.draft.get(field).to_string();
        value.push(c);
        self.update(field, value);
    }

    pub fn pop_char(&mut self, field: Field) {
        let mut value = self.draft.get(field).to_string();
        value.pop();
        self.update(field, value);
    }

    /// Immutable copy of the draft for sending
    pub fn snapshot(&self) -> ContactMessage {
        self.draft.clone()
    }

    pub fn clear(&mut self) {
        self.draft = ContactMessage::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// First empty (or whitespace-only) field in tab order
    #[error("Please fill in all fields")]
    MissingField(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingField(field) => *field,
        }
    }
}

/// Every field must contain something other than whitespace
pub fn validate(message: &ContactMessage) -> Result<(), ValidationError> {
    match Field::ALL.iter().find(|f| message.get(**f).trim().is_empty()) {
        Some(field) => Err(ValidationError::MissingField(*field)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactMessage {
        ContactMessage::new("John", "john@example.com", "Hi", "Hello")
    }

    #[test]
    fn test_update_replaces_only_one_field() {
        let mut form = ContactForm::new();
        form.update(Field::Name, "John");
        form.update(Field::Subject, "Hi");
        form.update(Field::Name, "Jane");

        assert_eq!(form.draft().name, "Jane");
        assert_eq!(form.draft().subject, "Hi");
        assert!(form.draft().email.is_empty());
        assert!(form.draft().message.is_empty());
    }

    #[test]
    fn test_keystrokes() {
        let mut form = ContactForm::new();
        for c in "Hey!".chars() {
            form.push_char(Field::Message, c);
        }
        form.pop_char(Field::Message);
        form.pop_char(Field::Email);

        assert_eq!(form.draft().message, "Hey");
        assert_eq!(form.draft().email, "");
    }

    #[test]
    fn test_snapshot_is_detached_from_draft() {
        let mut form = ContactForm::new();
        form.update(Field::Name, "John");
        let sent = form.snapshot();
        form.clear();

        assert_eq!(sent.name, "John");
        assert!(form.draft().is_blank());
    }

    #[test]
    fn test_validate_accepts_filled_draft() {
        assert_eq!(validate(&filled()), Ok(()));
    }

    #[test]
    fn test_validate_rejects_each_empty_field() {
        for field in Field::ALL {
            let mut form = ContactForm::new();
            for f in Field::ALL {
                form.update(f, filled().get(f));
            }
            form.update(field, "");

            let err = validate(form.draft()).unwrap_err();
            assert_eq!(err.field(), field);
            assert_eq!(err.to_string(), FILL_ALL_FIELDS);
        }
    }

    #[test]
    fn test_validate_rejects_whitespace_only() {
        let mut message = filled();
        message.subject = "   \n\t".to_string();
        assert_eq!(validate(&message), Err(ValidationError::MissingField(Field::Subject)));
    }

    #[test]
    fn test_field_order_wraps() {
        assert_eq!(Field::Message.next(), Field::Name);
        assert_eq!(Field::Name.prev(), Field::Message);
        assert_eq!(Field::Email.next(), Field::Subject);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(filled()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "John",
                "email": "john@example.com",
                "subject": "Hi",
                "message": "Hello"
            })
        );
    }
}
