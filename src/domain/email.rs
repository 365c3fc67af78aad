use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type EmailId = u32;

const REPLY_PREFIX: &str = "Re: ";

/// A message as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
    pub read: bool,
    pub archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mailbox {
    Inbox,
    Sent,
    Archive,
}

impl Mailbox {
    pub const ALL: [Mailbox; 3] = [Mailbox::Inbox, Mailbox::Sent, Mailbox::Archive];

    /// Path segment used by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Mailbox::Inbox => "inbox",
            Mailbox::Sent => "sent",
            Mailbox::Archive => "archive",
        }
    }

    /// Name with the first letter capitalized, used as the list header.
    pub fn title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mailbox '{0}' (expected inbox, sent or archive)")]
pub struct UnknownMailbox(pub String);

impl FromStr for Mailbox {
    type Err = UnknownMailbox;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mailbox::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMailbox(s.to_string()))
    }
}

/// In-progress compose form content. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeDraft {
    /// Free text, comma separated. Passed to the backend as typed.
    pub recipients: String,
    pub subject: String,
    pub body: String,
}

impl ComposeDraft {
    /// Draft answering `original`: addressed to its sender, subject
    /// prefixed once with "Re: ", original quoted under a header line.
    pub fn reply_to(original: &Email) -> Self {
        Self {
            recipients: original.sender.clone(),
            subject: reply_subject(&original.subject),
            body: format!(
                "\n\nOn {} {} wrote:\n{}",
                original.timestamp, original.sender, original.body
            ),
        }
    }

    pub fn to_outgoing(&self) -> OutgoingEmail {
        OutgoingEmail {
            recipients: self.recipients.clone(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

/// Case-sensitive literal prefix check, so "RE: x" still gets a prefix.
pub fn reply_subject(subject: &str) -> String {
    if subject.starts_with(REPLY_PREFIX) {
        subject.to_string()
    } else {
        format!("{REPLY_PREFIX}{subject}")
    }
}

/// Body of `POST /emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub recipients: String,
    pub subject: String,
    pub body: String,
}

/// Body of `PUT /emails/{id}`. Unset flags are left out of the JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl EmailUpdate {
    pub fn mark_read() -> Self {
        Self {
            read: Some(true),
            archived: None,
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            read: None,
            archived: Some(archived),
        }
    }
}

/// What the backend said about a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Accepted(Option<String>),
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Email {
        Email {
            id: 7,
            sender: "bob@example.com".into(),
            recipients: vec!["alice@example.com".into()],
            subject: "Meeting".into(),
            body: "See you at 10.\nBob".into(),
            timestamp: "Jan 01 2024, 10:00 AM".into(),
            read: false,
            archived: false,
        }
    }

    #[test]
    fn mailbox_titles_are_capitalized() {
        assert_eq!(Mailbox::Inbox.title(), "Inbox");
        assert_eq!(Mailbox::Sent.title(), "Sent");
        assert_eq!(Mailbox::Archive.title(), "Archive");
    }

    #[test]
    fn mailbox_parses_only_exact_names() {
        assert_eq!("sent".parse::<Mailbox>(), Ok(Mailbox::Sent));
        assert!("Sent".parse::<Mailbox>().is_err());
        assert!("archived".parse::<Mailbox>().is_err());
    }

    #[test]
    fn reply_prefixes_subject_once() {
        assert_eq!(reply_subject("Meeting"), "Re: Meeting");
        assert_eq!(reply_subject("Re: Meeting"), "Re: Meeting");
        assert_eq!(reply_subject("RE: Meeting"), "Re: RE: Meeting");
        assert_eq!(reply_subject(""), "Re: ");
    }

    #[test]
    fn reply_quotes_original() {
        let draft = ComposeDraft::reply_to(&sample());
        assert_eq!(draft.recipients, "bob@example.com");
        assert_eq!(draft.subject, "Re: Meeting");
        assert_eq!(
            draft.body,
            "\n\nOn Jan 01 2024, 10:00 AM bob@example.com wrote:\nSee you at 10.\nBob"
        );
    }

    #[test]
    fn update_serializes_only_the_set_flag() {
        let read = serde_json::to_value(EmailUpdate::mark_read()).unwrap();
        assert_eq!(read, serde_json::json!({ "read": true }));

        let unarchive = serde_json::to_value(EmailUpdate::archived(false)).unwrap();
        assert_eq!(unarchive, serde_json::json!({ "archived": false }));
    }

    #[test]
    fn email_deserializes_from_backend_shape() {
        let raw = r#"{
            "id": 3, "sender": "a@b.com", "recipients": ["c@d.com", "e@f.com"],
            "subject": "Hi", "body": "Hello", "timestamp": "Feb 2 2024, 1:00 PM",
            "read": true, "archived": false
        }"#;
        let email: Email = serde_json::from_str(raw).unwrap();
        assert_eq!(email.id, 3);
        assert_eq!(email.recipients, vec!["c@d.com", "e@f.com"]);
        assert!(email.read);
    }
}
