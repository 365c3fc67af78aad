use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::email::Mailbox;
use crate::terminal::controller::MailboxController;
use crate::terminal::state::{ComposeField, ViewState};
use crate::terminal::view::{self, Action, View};

/// Returns true when the user asked to quit.
pub fn handle_key(key: KeyEvent, ctl: &mut MailboxController) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    // alert is modal
    if ctl.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            ctl.dismiss_alert();
        }
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match ctl.view() {
        ViewState::MailboxList(_) => handle_list_keys(key, ctl),
        ViewState::EmailDetail(_) => handle_detail_keys(key, ctl),
        ViewState::Compose => {
            handle_compose_keys(key, ctl);
            false
        }
    }
}

/// Tab bar shortcuts, available outside the compose form.
fn handle_nav_key(c: char, ctl: &mut MailboxController) {
    let action = match c {
        'i' => Action::ShowMailbox(Mailbox::Inbox),
        's' => Action::ShowMailbox(Mailbox::Sent),
        'a' => Action::ShowMailbox(Mailbox::Archive),
        'c' => Action::Compose,
        _ => return,
    };
    ctl.perform(action);
}

fn handle_list_keys(key: KeyEvent, ctl: &mut MailboxController) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Down | KeyCode::Char('j') => ctl.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => ctl.move_selection(-1),
        KeyCode::Enter => {
            if let Some(action) = view::render(ctl).selected_row().map(|r| r.action) {
                ctl.perform(action);
            }
        }
        KeyCode::Char(c) => handle_nav_key(c, ctl),
        _ => {}
    }
    false
}

fn handle_detail_keys(key: KeyEvent, ctl: &mut MailboxController) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => ctl.perform(Action::ShowMailbox(Mailbox::Inbox)),
        KeyCode::Char(c) => {
            match view::render(ctl).control_for_key(c).map(|control| control.action) {
                Some(action) => ctl.perform(action),
                None => handle_nav_key(c, ctl),
            }
        }
        _ => {}
    }
    false
}

fn handle_compose_keys(key: KeyEvent, ctl: &mut MailboxController) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => {
            if let View::Compose(form) = view::render(ctl).body {
                ctl.perform(form.submit);
            }
        }
        KeyCode::Esc => ctl.perform(Action::ShowMailbox(Mailbox::Inbox)),
        KeyCode::Tab => ctl.compose_mut().next_field(),
        KeyCode::BackTab => ctl.compose_mut().prev_field(),
        KeyCode::Enter => {
            let form = ctl.compose_mut();
            if form.focus == ComposeField::Body {
                form.insert('\n');
            } else {
                form.next_field();
            }
        }
        KeyCode::Backspace => ctl.compose_mut().backspace(),
        KeyCode::Left => ctl.compose_mut().move_left(),
        KeyCode::Right => ctl.compose_mut().move_right(),
        KeyCode::Char(c) if !ctrl => ctl.compose_mut().insert(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::email::OutgoingEmail;
    use crate::mail::fake::{Call, FakeApi, email};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(ctl: &mut MailboxController, s: &str) {
        for c in s.chars() {
            handle_key(press(KeyCode::Char(c)), ctl);
        }
    }

    #[test]
    fn typed_draft_is_sent_verbatim() {
        let api = Arc::new(FakeApi::default());
        api.set_mailbox(Mailbox::Sent, vec![]);
        let mut ctl = MailboxController::new(api.clone(), "me@x.com");

        handle_key(press(KeyCode::Char('c')), &mut ctl);
        assert_eq!(ctl.view(), ViewState::Compose);

        type_str(&mut ctl, "a@b.com");
        handle_key(press(KeyCode::Enter), &mut ctl);
        type_str(&mut ctl, "Hi");
        handle_key(press(KeyCode::Tab), &mut ctl);
        type_str(&mut ctl, "Hello");
        handle_key(press(KeyCode::Enter), &mut ctl);
        handle_key(press(KeyCode::Backspace), &mut ctl);
        handle_key(ctrl('s'), &mut ctl);
        ctl.settle();

        assert_eq!(
            api.calls()[0],
            Call::Send(OutgoingEmail {
                recipients: "a@b.com".into(),
                subject: "Hi".into(),
                body: "Hello".into(),
            })
        );
        assert_eq!(ctl.view(), ViewState::MailboxList(Mailbox::Sent));
    }

    #[test]
    fn alert_swallows_keys_until_dismissed() {
        let api = Arc::new(FakeApi::default());
        api.reject_sends("Invalid recipient");
        let mut ctl = MailboxController::new(api, "me@x.com");

        ctl.show_compose();
        handle_key(ctrl('s'), &mut ctl);
        ctl.settle();
        assert!(ctl.alert().is_some());

        type_str(&mut ctl, "zz");
        assert_eq!(ctl.compose().draft.recipients, "");

        handle_key(press(KeyCode::Enter), &mut ctl);
        assert!(ctl.alert().is_none());
        assert_eq!(ctl.view(), ViewState::Compose);
    }

    #[test]
    fn list_navigation_opens_selected_row() {
        let api = Arc::new(FakeApi::default());
        api.set_mailbox(
            Mailbox::Inbox,
            vec![email(1, "a@x.com", "one"), email(2, "b@x.com", "two")],
        );
        let mut ctl = MailboxController::new(api, "me@x.com");
        ctl.start();
        ctl.settle();

        handle_key(press(KeyCode::Char('j')), &mut ctl);
        handle_key(press(KeyCode::Char('j')), &mut ctl);
        handle_key(press(KeyCode::Enter), &mut ctl);
        ctl.settle();
        assert_eq!(ctl.view(), ViewState::EmailDetail(2));

        handle_key(press(KeyCode::Char('b')), &mut ctl);
        assert_eq!(ctl.view(), ViewState::MailboxList(Mailbox::Inbox));
        assert!(handle_key(press(KeyCode::Char('q')), &mut ctl));
    }

    #[test]
    fn archive_key_ignored_for_own_mail() {
        let api = Arc::new(FakeApi::default());
        api.add_email(email(3, "me@x.com", "mine"));
        let mut ctl = MailboxController::new(api.clone(), "me@x.com");
        ctl.show_email(3);
        ctl.settle();

        handle_key(press(KeyCode::Char('A')), &mut ctl);
        ctl.settle();
        assert_eq!(ctl.view(), ViewState::EmailDetail(3));
        assert!(
            !api.calls()
                .iter()
                .any(|c| matches!(c, Call::Update(_, u) if u.archived.is_some()))
        );
    }
}
