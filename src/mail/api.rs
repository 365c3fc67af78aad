use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::email::{Email, EmailId, EmailUpdate, Mailbox, OutgoingEmail, SendOutcome};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never completed (connect, TLS, timeout...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The remote mail backend.
pub trait MailApi: Send + Sync {
    /// `GET /emails/{mailbox}`. Order is the backend's.
    fn list_mailbox(&self, mailbox: Mailbox) -> ApiResult<Vec<Email>>;

    /// `GET /emails/{id}`
    fn get_email(&self, id: EmailId) -> ApiResult<Email>;

    /// `PUT /emails/{id}`. Only the status is consulted.
    fn update_email(&self, id: EmailId, update: &EmailUpdate) -> ApiResult<()>;

    /// `POST /emails`. A response with an `error` field is a
    /// [`SendOutcome::Rejected`], not an `Err`.
    fn send_email(&self, email: &OutgoingEmail) -> ApiResult<SendOutcome>;
}
