pub mod controller;
pub mod dispatch;
pub mod events;
pub mod state;
pub mod ui;
pub mod view;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;

use crate::domain::email::Mailbox;
use crate::mail::api::MailApi;
use controller::MailboxController;

/// How long to wait for a key before checking for finished requests.
const TICK: Duration = Duration::from_millis(50);

pub fn run_tui(api: Arc<dyn MailApi>, current_user: &str, mailbox: Option<Mailbox>) -> Result<()> {
    let mut ctl = MailboxController::new(api, current_user);
    match mailbox {
        Some(m) => ctl.show_mailbox(m),
        None => ctl.start(),
    }

    let terminal = ratatui::init();
    let result = run(terminal, &mut ctl);
    ratatui::restore();

    result
}

fn run(mut terminal: DefaultTerminal, ctl: &mut MailboxController) -> Result<()> {
    loop {
        ctl.pump();
        let screen = view::render(ctl);
        terminal.draw(|f| ui::draw(f, &screen))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if events::handle_key(key, ctl) {
                    break;
                }
            }
        }
    }
    Ok(())
}
