//! Controller state → view tree. Pure; drawing lives in `ui`.

use crate::domain::email::{Email, EmailId, Mailbox};
use crate::terminal::controller::MailboxController;
use crate::terminal::state::{ComposeField, ViewState};

/// What activating a row or control does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowMailbox(Mailbox),
    Compose,
    Open(EmailId),
    ToggleArchive { id: EmailId, archived: bool },
    Reply(EmailId),
    Send,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub user: String,
    pub body: View,
    /// Modal message; blocks other input until dismissed.
    pub alert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    MailboxList(ListView),
    Compose(ComposeView),
    /// `None` until an email has loaded at least once.
    Detail(Option<DetailView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub header: String,
    pub rows: Vec<Row>,
    pub selected: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    Unread,
    Read,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub sender: String,
    pub subject: String,
    pub timestamp: String,
    pub tone: RowTone,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: ComposeField,
    pub label: &'static str,
    pub value: String,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeView {
    pub fields: Vec<FieldView>,
    /// Char offset inside the focused field.
    pub cursor: usize,
    pub submit: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub key: char,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub controls: Vec<Control>,
    pub sender: String,
    pub recipients: String,
    pub subject: String,
    pub timestamp: String,
    pub body_lines: Vec<String>,
}

impl Screen {
    pub fn control_for_key(&self, key: char) -> Option<&Control> {
        match &self.body {
            View::Detail(Some(d)) => d.controls.iter().find(|c| c.key == key),
            _ => None,
        }
    }

    pub fn selected_row(&self) -> Option<&Row> {
        match &self.body {
            View::MailboxList(list) => list.selected.and_then(|i| list.rows.get(i)),
            _ => None,
        }
    }
}

pub fn render(ctl: &MailboxController) -> Screen {
    let body = match ctl.view() {
        ViewState::MailboxList(mailbox) => View::MailboxList(ListView {
            header: mailbox.title(),
            rows: ctl.rows().iter().map(row).collect(),
            selected: ctl.selected(),
        }),
        ViewState::Compose => {
            let form = ctl.compose();
            let fields = [
                ComposeField::Recipients,
                ComposeField::Subject,
                ComposeField::Body,
            ]
            .into_iter()
            .map(|field| FieldView {
                field,
                label: field.label(),
                value: form.field(field).to_string(),
                focused: form.focus == field,
            })
            .collect();
            View::Compose(ComposeView {
                fields,
                cursor: form.cursor,
                submit: Action::Send,
            })
        }
        ViewState::EmailDetail(id) => View::Detail(ctl.detail().map(|e| {
            let mut d = detail(e, ctl.can_archive(e));
            // previous email still on screen while `id` loads: only navigation
            if e.id != id {
                d.controls
                    .retain(|c| matches!(c.action, Action::ShowMailbox(_)));
            }
            d
        })),
    };

    Screen {
        user: ctl.current_user().to_string(),
        body,
        alert: ctl.alert().map(str::to_string),
    }
}

fn row(email: &Email) -> Row {
    Row {
        sender: email.sender.clone(),
        subject: email.subject.clone(),
        timestamp: email.timestamp.clone(),
        tone: if email.read {
            RowTone::Read
        } else {
            RowTone::Unread
        },
        action: Action::Open(email.id),
    }
}

fn detail(email: &Email, can_archive: bool) -> DetailView {
    let mut controls = vec![Control {
        label: "Back to Inbox",
        key: 'b',
        action: Action::ShowMailbox(Mailbox::Inbox),
    }];
    if can_archive {
        controls.push(Control {
            label: if email.archived { "Unarchive" } else { "Archive" },
            key: 'A',
            action: Action::ToggleArchive {
                id: email.id,
                archived: email.archived,
            },
        });
    }
    controls.push(Control {
        label: "Reply",
        key: 'r',
        action: Action::Reply(email.id),
    });

    DetailView {
        controls,
        sender: email.sender.clone(),
        recipients: email.recipients.join(", "),
        subject: email.subject.clone(),
        timestamp: email.timestamp.clone(),
        body_lines: email
            .body
            .split('\n')
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(id: EmailId, sender: &str, read: bool, archived: bool) -> Email {
        Email {
            id,
            sender: sender.into(),
            recipients: vec!["me@x.com".into(), "you@x.com".into()],
            subject: format!("subject {id}"),
            body: "line one\r\nline two\n\nend".into(),
            timestamp: "Mar 3 2024, 9:00 AM".into(),
            read,
            archived,
        }
    }

    #[test]
    fn rows_follow_input_and_bind_their_id() {
        let rows: Vec<_> = [email(9, "a", true, false), email(4, "b", false, false)]
            .iter()
            .map(row)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].action, Action::Open(9));
        assert_eq!(rows[1].action, Action::Open(4));
        assert_eq!(rows[0].tone, RowTone::Read);
        assert_eq!(rows[1].tone, RowTone::Unread);
    }

    fn labels(d: &DetailView) -> Vec<&'static str> {
        d.controls.iter().map(|c| c.label).collect()
    }

    #[test]
    fn archive_control_reflects_state() {
        let inbox = detail(&email(1, "boss@x.com", true, false), true);
        assert_eq!(labels(&inbox), vec!["Back to Inbox", "Archive", "Reply"]);

        let archived = detail(&email(1, "boss@x.com", true, true), true);
        assert_eq!(labels(&archived), vec!["Back to Inbox", "Unarchive", "Reply"]);
        assert_eq!(
            archived.controls[1].action,
            Action::ToggleArchive {
                id: 1,
                archived: true
            }
        );
    }

    #[test]
    fn own_mail_has_no_archive_control() {
        let d = detail(&email(1, "me@x.com", true, false), false);
        assert_eq!(labels(&d), vec!["Back to Inbox", "Reply"]);
    }

    #[test]
    fn detail_joins_recipients_and_splits_body() {
        let d = detail(&email(1, "a", true, false), true);
        assert_eq!(d.recipients, "me@x.com, you@x.com");
        assert_eq!(d.body_lines, vec!["line one", "line two", "", "end"]);
    }

    #[test]
    fn markup_in_content_stays_plain_text() {
        let mut e = email(1, "<b>evil</b>", false, false);
        e.subject = "<script>x</script>".into();
        let r = row(&e);
        assert_eq!(r.sender, "<b>evil</b>");
        assert_eq!(r.subject, "<script>x</script>");
    }
}
