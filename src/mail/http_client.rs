use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::domain::email::{Email, EmailId, EmailUpdate, Mailbox, OutgoingEmail, SendOutcome};
use crate::mail::api::{ApiError, ApiResult, MailApi};

/// Session cookie sent with every request.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpMailApi {
    base: Url,
    client: Client,
}

impl HttpMailApi {
    pub fn new(
        base_url: &str,
        session: Option<&SessionCookie>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let mut base = Url::parse(base_url)?;
        // Url::join drops the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(session_headers(session))
            .build()?;

        Ok(Self { base, client })
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base.join(path)?)
    }
}

fn session_headers(session: Option<&SessionCookie>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(s) = session {
        match HeaderValue::from_str(&format!("{}={}", s.name, s.value)) {
            Ok(v) => {
                headers.insert(COOKIE, v);
            }
            Err(_) => warn!("session cookie contains invalid header characters; sending none"),
        }
    }
    headers
}

fn expect_success(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ApiError::Status { status, body })
}

impl MailApi for HttpMailApi {
    fn list_mailbox(&self, mailbox: Mailbox) -> ApiResult<Vec<Email>> {
        let url = self.endpoint(&format!("emails/{}", mailbox.as_str()))?;
        debug!("GET {url}");
        let resp = expect_success(self.client.get(url).send()?)?;
        let text = resp.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn get_email(&self, id: EmailId) -> ApiResult<Email> {
        let url = self.endpoint(&format!("emails/{id}"))?;
        debug!("GET {url}");
        let resp = expect_success(self.client.get(url).send()?)?;
        let text = resp.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn update_email(&self, id: EmailId, update: &EmailUpdate) -> ApiResult<()> {
        let url = self.endpoint(&format!("emails/{id}"))?;
        debug!("PUT {url} {update:?}");
        expect_success(self.client.put(url).json(update).send()?)?;
        Ok(())
    }

    fn send_email(&self, email: &OutgoingEmail) -> ApiResult<SendOutcome> {
        let url = self.endpoint("emails")?;
        debug!("POST {url}");
        let resp = self.client.post(url).json(email).send()?;
        let status = resp.status();
        let text = resp.text()?;

        // The error field decides, whatever the status says.
        match serde_json::from_str::<SendResponse>(&text) {
            Ok(SendResponse {
                error: Some(error), ..
            }) => Ok(SendOutcome::Rejected(error)),
            Ok(SendResponse { message, .. }) => Ok(SendOutcome::Accepted(message)),
            Err(_) if !status.is_success() => Err(ApiError::Status { status, body: text }),
            Err(e) => Err(e.into()),
        }
    }
}
