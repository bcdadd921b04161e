//! Submission lifecycle: `Idle -> Submitting -> {Success, Error}`.
//!
//! The flow owns the draft so that it alone decides when the draft may change:
//! edits are refused while a request is in flight or while the success banner
//! is up, and the draft is only cleared once the success delay has elapsed.

use std::time::{Duration, Instant};

use super::{validate, ContactForm, ContactMessage, ValidationError};

pub const SUCCESS_FALLBACK: &str = "Message sent successfully! I'll get back to you soon.";
pub const SENDING: &str = "Sending...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Success { message: String, since: Instant },
    Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

/// Why a submit request did not start a network call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// A request is already in flight, or the success banner is showing
    Busy,
    Invalid(ValidationError),
}

#[derive(Debug, Clone)]
pub struct SubmitFlow {
    form: ContactForm,
    status: SubmitStatus,
    reset_delay: Duration,
}

impl SubmitFlow {
    pub fn new(reset_delay: Duration) -> Self {
        Self {
            form: ContactForm::new(),
            status: SubmitStatus::Idle,
            reset_delay,
        }
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    #[cfg(test)]
    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    pub fn is_submitting(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    /// The draft can be edited while idle or after a failure
    pub fn is_editable(&self) -> bool {
        matches!(self.status, SubmitStatus::Idle | SubmitStatus::Error { .. })
    }

    /// Apply an edit to the draft. Returns false if the form is locked.
    pub fn edit(&mut self, f: impl FnOnce(&mut ContactForm)) -> bool {
        if !self.is_editable() {
            return false;
        }
        f(&mut self.form);
        true
    }

    /// Validate and move to `Submitting`. On success the caller owns the
    /// returned snapshot and must issue exactly one request for it.
    pub fn begin_submit(&mut self) -> Result<ContactMessage, Rejected> {
        if !self.is_editable() {
            return Err(Rejected::Busy);
        }

        if let Err(err) = validate(self.form.draft()) {
            self.status = SubmitStatus::Error { message: err.to_string() };
            return Err(Rejected::Invalid(err));
        }

        self.status = SubmitStatus::Submitting;
        Ok(self.form.snapshot())
    }

    /// The server accepted the message
    pub fn complete(&mut self, server_message: Option<String>, now: Instant) {
        if !self.is_submitting() {
            tracing::debug!("Ignoring completion outside of an active submission");
            return;
        }
        let message = server_message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| SUCCESS_FALLBACK.to_string());
        self.status = SubmitStatus::Success { message, since: now };
    }

    /// The request failed; the draft is left as it was
    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_submitting() {
            tracing::debug!("Ignoring failure outside of an active submission");
            return;
        }
        self.status = SubmitStatus::Error { message: message.into() };
    }

    /// Clear the draft once the success banner has been up long enough.
    /// Returns true when the reset happened on this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let SubmitStatus::Success { since, .. } = self.status {
            if now.saturating_duration_since(since) >= self.reset_delay {
                self.form.clear();
                self.status = SubmitStatus::Idle;
                return true;
            }
        }
        false
    }

    /// Seconds left before the success reset, for display
    pub fn reset_remaining(&self, now: Instant) -> Option<u64> {
        match self.status {
            SubmitStatus::Success { since, .. } => {
                let left = self.reset_delay.saturating_sub(now.saturating_duration_since(since));
                Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
            }
            _ => None,
        }
    }

    pub fn banner(&self) -> Option<(BannerKind, &str)> {
        match &self.status {
            SubmitStatus::Idle => None,
            SubmitStatus::Submitting => Some((BannerKind::Info, SENDING)),
            SubmitStatus::Success { message, .. } => Some((BannerKind::Success, message.as_str())),
            SubmitStatus::Error { message } => Some((BannerKind::Error, message.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Field, FILL_ALL_FIELDS};

    const DELAY: Duration = Duration::from_secs(4);

    fn filled_flow() -> SubmitFlow {
        let mut flow = SubmitFlow::new(DELAY);
        flow.edit(|form| {
            form.update(Field::Name, "John");
            form.update(Field::Email, "john@example.com");
            form.update(Field::Subject, "Hi");
            form.update(Field::Message, "Hello");
        });
        flow
    }

    #[test]
    fn test_invalid_draft_never_submits() {
        let mut flow = filled_flow();
        flow.edit(|form| form.update(Field::Name, ""));

        let result = flow.begin_submit();
        assert_eq!(result, Err(Rejected::Invalid(ValidationError::MissingField(Field::Name))));
        assert_eq!(flow.banner(), Some((BannerKind::Error, FILL_ALL_FIELDS)));
        assert_eq!(flow.form().draft().email, "john@example.com");
    }

    #[test]
    fn test_no_reentry_while_submitting() {
        let mut flow = filled_flow();
        let sent = flow.begin_submit().unwrap();
        assert_eq!(sent.subject, "Hi");
        assert!(flow.is_submitting());

        assert_eq!(flow.begin_submit(), Err(Rejected::Busy));
        assert!(!flow.edit(|form| form.update(Field::Name, "Jane")));
        assert_eq!(flow.form().draft().name, "John");
        assert_eq!(flow.banner(), Some((BannerKind::Info, SENDING)));
    }

    #[test]
    fn test_success_clears_after_delay() {
        let mut flow = filled_flow();
        let start = Instant::now();
        flow.begin_submit().unwrap();
        flow.complete(None, start);

        assert_eq!(flow.banner(), Some((BannerKind::Success, SUCCESS_FALLBACK)));
        assert_eq!(flow.reset_remaining(start), Some(4));

        // Still showing, draft kept, form locked
        assert!(!flow.tick(start + Duration::from_secs(3)));
        assert_eq!(flow.form().draft().name, "John");
        assert!(!flow.is_editable());
        assert_eq!(flow.begin_submit(), Err(Rejected::Busy));

        assert!(flow.tick(start + DELAY));
        assert!(flow.form().draft().is_blank());
        assert_eq!(flow.status(), &SubmitStatus::Idle);
        assert!(flow.banner().is_none());
    }

    #[test]
    fn test_success_uses_server_message() {
        let mut flow = filled_flow();
        flow.begin_submit().unwrap();
        flow.complete(Some("Message sent successfully".into()), Instant::now());
        assert_eq!(flow.banner(), Some((BannerKind::Success, "Message sent successfully")));
    }

    #[test]
    fn test_failure_keeps_draft_and_allows_retry() {
        let mut flow = filled_flow();
        let before = flow.form().snapshot();
        flow.begin_submit().unwrap();
        flow.fail("Invalid email");

        assert_eq!(flow.banner(), Some((BannerKind::Error, "Invalid email")));
        assert_eq!(flow.form().draft(), &before);
        assert!(!flow.tick(Instant::now() + Duration::from_secs(60)));
        assert_eq!(flow.form().draft(), &before);

        assert!(flow.edit(|form| form.update(Field::Email, "john@example.org")));
        assert!(flow.begin_submit().is_ok());
        assert!(flow.is_submitting());
    }

    #[test]
    fn test_outcomes_ignored_when_not_submitting() {
        let mut flow = filled_flow();
        flow.complete(None, Instant::now());
        flow.fail("late");
        assert_eq!(flow.status(), &SubmitStatus::Idle);
    }
}
