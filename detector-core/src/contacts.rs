//! Notification recipients.

use crate::error::{DetectorError, Result};

/// Ordered list of e-mail addresses notified on every detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailList {
    emails: Vec<String>,
}

impl EmailList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_emails(emails: Vec<String>) -> Self {
        Self { emails }
    }

    /// Adds a trimmed address. Requires an `@` and rejects duplicates.
    pub fn add(&mut self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DetectorError::InvalidEmail(email.to_string()));
        }
        if self.emails.iter().any(|e| e == email) {
            return Err(DetectorError::DuplicateEmail(email.to_string()));
        }
        self.emails.push(email.to_string());
        Ok(())
    }

    /// Removes `email`; returns whether it was present.
    pub fn remove(&mut self, email: &str) -> bool {
        let before = self.emails.len();
        self.emails.retain(|e| e != email);
        before != self.emails.len()
    }

    pub fn all(&self) -> &[String] {
        &self.emails
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_trimmed_address() {
        let mut list = EmailList::new();
        list.add("  anna@example.org ").unwrap();
        assert_eq!(list.all(), ["anna@example.org"]);
    }

    #[test]
    fn rejects_invalid_and_duplicate() {
        let mut list = EmailList::new();
        assert!(matches!(list.add(""), Err(DetectorError::InvalidEmail(_))));
        assert!(matches!(list.add("no-at-sign"), Err(DetectorError::InvalidEmail(_))));
        list.add("a@b.c").unwrap();
        assert!(matches!(list.add("a@b.c"), Err(DetectorError::DuplicateEmail(_))));
        assert_eq!(list.all().len(), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let mut list = EmailList::from_emails(vec!["a@b.c".into()]);
        assert!(!list.remove("x@y.z"));
        assert!(list.remove("a@b.c"));
        assert!(list.is_empty());
    }
}
