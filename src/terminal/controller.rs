use std::sync::Arc;

use log::{debug, error, info};

use crate::domain::email::{ComposeDraft, Email, EmailId, EmailUpdate, Mailbox, SendOutcome};
use crate::mail::api::MailApi;
use crate::terminal::dispatch::{Completion, Dispatcher, Outcome};
use crate::terminal::state::{ComposeField, ComposeForm, Panel, ViewState, step_selection};
use crate::terminal::view::Action;

pub const SEND_FAILED: &str = "Failed to send email";

/// Owns the three panels and every transition between them.
///
/// All backend calls go through the [`Dispatcher`]; their results come
/// back via [`apply`](Self::apply) on the thread that owns the controller.
pub struct MailboxController {
    dispatcher: Dispatcher,
    current_user: String,
    view: ViewState,

    rows: Vec<Email>,
    selected: Option<usize>,

    /// Last email successfully loaded into the detail panel.
    detail: Option<Email>,

    compose: ComposeForm,
    alert: Option<String>,
}

impl MailboxController {
    pub fn new(api: Arc<dyn MailApi>, current_user: impl Into<String>) -> Self {
        Self {
            dispatcher: Dispatcher::new(api),
            current_user: current_user.into(),
            view: ViewState::MailboxList(Mailbox::Inbox),
            rows: Vec::new(),
            selected: None,
            detail: None,
            compose: ComposeForm::default(),
            alert: None,
        }
    }

    /// Initial transition: the inbox.
    pub fn start(&mut self) {
        self.show_mailbox(Mailbox::Inbox);
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.view.panel() == panel
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    pub fn rows(&self) -> &[Email] {
        &self.rows
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn detail(&self) -> Option<&Email> {
        self.detail.as_ref()
    }

    pub fn compose(&self) -> &ComposeForm {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut ComposeForm {
        &mut self.compose
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Emails the current user sent can't be archived by them.
    pub fn can_archive(&self, email: &Email) -> bool {
        email.sender != self.current_user
    }

    fn transition(&mut self, next: ViewState) {
        debug!("view {:?} -> {:?}", self.view, next);
        self.view = next;
        self.dispatcher.advance();
    }

    pub fn show_mailbox(&mut self, mailbox: Mailbox) {
        self.transition(ViewState::MailboxList(mailbox));
        self.rows.clear();
        self.selected = None;
        self.dispatcher.request(move |api| Outcome::Mailbox {
            mailbox,
            result: api.list_mailbox(mailbox),
        });
    }

    pub fn show_compose(&mut self) {
        self.transition(ViewState::Compose);
        self.compose = ComposeForm::default();
    }

    pub fn submit_compose(&mut self) {
        if self.view != ViewState::Compose {
            return;
        }
        let outgoing = self.compose.draft.to_outgoing();
        debug!("sending to '{}'", outgoing.recipients);
        self.dispatcher
            .request(move |api| Outcome::Sent(api.send_email(&outgoing)));
    }

    /// Detail content is only replaced once the new email arrives.
    pub fn show_email(&mut self, id: EmailId) {
        self.transition(ViewState::EmailDetail(id));
        self.dispatcher.request(move |api| Outcome::Email {
            id,
            result: api.get_email(id),
        });
    }

    pub fn toggle_archive(&mut self, id: EmailId, currently_archived: bool) {
        let update = EmailUpdate::archived(!currently_archived);
        self.dispatcher.request(move |api| Outcome::Archived {
            id,
            result: api.update_email(id, &update),
        });
    }

    pub fn reply_to(&mut self, id: EmailId) {
        self.dispatcher.request(move |api| Outcome::ReplySource {
            id,
            result: api.get_email(id),
        });
    }

    pub fn move_selection(&mut self, delta: i32) {
        self.selected = step_selection(self.selected, self.rows.len(), delta);
    }

    pub fn perform(&mut self, action: Action) {
        match action {
            Action::ShowMailbox(mailbox) => self.show_mailbox(mailbox),
            Action::Compose => self.show_compose(),
            Action::Open(id) => self.show_email(id),
            Action::ToggleArchive { id, archived } => self.toggle_archive(id, archived),
            Action::Reply(id) => self.reply_to(id),
            Action::Send => self.submit_compose(),
        }
    }

    pub fn apply(&mut self, completion: Completion) {
        // every successful open is marked read, even one the user already left
        if let Outcome::Email { id, result: Ok(_) } = &completion.outcome {
            let id = *id;
            self.dispatcher.best_effort("mark read", move |api| {
                api.update_email(id, &EmailUpdate::mark_read())
            });
        }

        if !self.dispatcher.is_current(completion.generation) {
            debug!(
                "dropping stale response (generation {}, now {})",
                completion.generation,
                self.dispatcher.generation()
            );
            return;
        }

        match completion.outcome {
            Outcome::Mailbox { mailbox, result } => match result {
                Ok(emails) => {
                    debug!("{} {} emails", emails.len(), mailbox);
                    self.rows = emails;
                    self.selected = if self.rows.is_empty() { None } else { Some(0) };
                }
                Err(e) => error!("Error loading emails: {e}"),
            },

            Outcome::Email { id, result } => match result {
                Ok(email) => self.detail = Some(email),
                Err(e) => error!("Error loading email {id}: {e}"),
            },

            Outcome::Sent(result) => match result {
                Ok(SendOutcome::Rejected(reason)) => {
                    self.alert = Some(format!("Error: {reason}"));
                }
                Ok(SendOutcome::Accepted(message)) => {
                    info!(
                        "Email sent successfully{}",
                        message.map(|m| format!(": {m}")).unwrap_or_default()
                    );
                    self.show_mailbox(Mailbox::Sent);
                }
                Err(e) => {
                    error!("Error sending email: {e}");
                    self.alert = Some(SEND_FAILED.to_string());
                }
            },

            Outcome::Archived { id, result } => match result {
                Ok(()) => self.show_mailbox(Mailbox::Inbox),
                Err(e) => error!("Error archiving email {id}: {e}"),
            },

            Outcome::ReplySource { id, result } => match result {
                Ok(original) => {
                    self.show_compose();
                    self.compose.draft = ComposeDraft::reply_to(&original);
                    self.compose.focus_start(ComposeField::Body);
                }
                Err(e) => error!("Error loading email {id} for reply: {e}"),
            },

            Outcome::Aborted => error!("request aborted"),
        }
    }

    /// Applies whatever already finished. Returns true if anything did.
    pub fn pump(&mut self) -> bool {
        let mut any = false;
        while let Some(c) = self.dispatcher.try_next() {
            self.apply(c);
            any = true;
        }
        any
    }

    /// Blocks until no request is in flight and best-effort work is done.
    pub fn settle(&mut self) {
        while let Some(c) = self.dispatcher.wait_next() {
            self.apply(c);
        }
        self.dispatcher.join_background();
    }
}
