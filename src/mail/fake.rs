//! In-memory backend used by unit tests. Records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::StatusCode;

use crate::domain::email::{Email, EmailId, EmailUpdate, Mailbox, OutgoingEmail, SendOutcome};
use crate::mail::api::{ApiError, ApiResult, MailApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(Mailbox),
    Get(EmailId),
    Update(EmailId, EmailUpdate),
    Send(OutgoingEmail),
}

#[derive(Default)]
struct Inner {
    mailboxes: HashMap<Mailbox, Vec<Email>>,
    emails: HashMap<EmailId, Email>,
    send_error: Option<String>,
    send_broken: bool,
    fail_updates: bool,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

fn status(code: StatusCode) -> ApiError {
    ApiError::Status {
        status: code,
        body: String::new(),
    }
}

pub fn email(id: EmailId, sender: &str, subject: &str) -> Email {
    Email {
        id,
        sender: sender.to_string(),
        recipients: vec!["me@example.com".to_string()],
        subject: subject.to_string(),
        body: format!("body of {id}"),
        timestamp: "Jan 01 2024, 10:00 AM".to_string(),
        read: false,
        archived: false,
    }
}

impl FakeApi {
    /// Mailboxes that were never set answer 404.
    pub fn set_mailbox(&self, mailbox: Mailbox, emails: Vec<Email>) {
        let mut inner = self.inner.lock().unwrap();
        for e in &emails {
            inner.emails.insert(e.id, e.clone());
        }
        inner.mailboxes.insert(mailbox, emails);
    }

    pub fn add_email(&self, email: Email) {
        self.inner.lock().unwrap().emails.insert(email.id, email);
    }

    pub fn reject_sends(&self, error: &str) {
        self.inner.lock().unwrap().send_error = Some(error.to_string());
    }

    pub fn break_sends(&self) {
        self.inner.lock().unwrap().send_broken = true;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.inner.lock().unwrap().fail_updates = fail;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl MailApi for FakeApi {
    fn list_mailbox(&self, mailbox: Mailbox) -> ApiResult<Vec<Email>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::List(mailbox));
        inner
            .mailboxes
            .get(&mailbox)
            .cloned()
            .ok_or_else(|| status(StatusCode::NOT_FOUND))
    }

    fn get_email(&self, id: EmailId) -> ApiResult<Email> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Get(id));
        inner
            .emails
            .get(&id)
            .cloned()
            .ok_or_else(|| status(StatusCode::NOT_FOUND))
    }

    fn update_email(&self, id: EmailId, update: &EmailUpdate) -> ApiResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Update(id, *update));
        if inner.fail_updates {
            return Err(status(StatusCode::INTERNAL_SERVER_ERROR));
        }
        let email = inner
            .emails
            .get_mut(&id)
            .ok_or_else(|| status(StatusCode::NOT_FOUND))?;
        if let Some(read) = update.read {
            email.read = read;
        }
        if let Some(archived) = update.archived {
            email.archived = archived;
        }
        Ok(())
    }

    fn send_email(&self, email: &OutgoingEmail) -> ApiResult<SendOutcome> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Send(email.clone()));
        if inner.send_broken {
            return Err(status(StatusCode::BAD_GATEWAY));
        }
        Ok(match &inner.send_error {
            Some(e) => SendOutcome::Rejected(e.clone()),
            None => SendOutcome::Accepted(Some("Email sent successfully.".to_string())),
        })
    }
}
