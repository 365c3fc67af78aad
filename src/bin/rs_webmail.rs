use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use log::warn;

use rs_webmail::auth::session_store;
use rs_webmail::config::{Config, load_config, log_path};
use rs_webmail::domain::email::{EmailId, EmailUpdate, Mailbox, OutgoingEmail, SendOutcome};
use rs_webmail::mail::api::MailApi;
use rs_webmail::mail::http_client::{HttpMailApi, SessionCookie};
use rs_webmail::terminal::run_tui;

#[derive(Parser)]
#[command(name = "rs_webmail")]
#[command(about = "Terminal client for a JSON webmail backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the TUI
    Tui {
        /// Mailbox to open first (inbox, sent, archive)
        #[arg(long)]
        mailbox: Option<Mailbox>,
    },

    /// Print one line per email of a mailbox
    List { mailbox: Mailbox },

    /// Print an email and mark it read
    Read { id: EmailId },

    /// Send an email
    Send {
        /// Comma separated recipients
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Store the backend session value in the keyring
    SetSession {
        /// Defaults to user_email from the config
        #[arg(long)]
        user: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // the TUI owns the screen, so its log goes to a file
    if matches!(cli.cmd, Command::Tui { .. }) {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path()?)?;
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else {
        env_logger::init();
    }

    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;

    match cli.cmd {
        Command::SetSession { user } => {
            let user = user
                .or_else(|| cfg.user_email.clone())
                .ok_or_else(|| anyhow!("no --user given and user_email not set in config"))?;
            eprintln!("Paste session value (end with Ctrl-D):");
            let mut session = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut session)?;
            session_store::save_session(&user, session.trim())?;
            println!("Saved session for {user}");
            Ok(())
        }

        Command::Tui { mailbox } => {
            let api = connect(&cfg)?;
            let user = cfg.user_email.clone().unwrap_or_default();
            if user.is_empty() {
                warn!("user_email not set; every email will offer Archive");
            }
            run_tui(Arc::new(api), &user, mailbox)
        }

        Command::List { mailbox } => {
            let api = connect(&cfg)?;
            let emails = api
                .list_mailbox(mailbox)
                .with_context(|| format!("loading {mailbox}"))?;
            println!("{}", mailbox.title());
            for e in emails {
                let marker = if e.read { ' ' } else { '*' };
                println!(
                    "{:>5} {} {:<30} {} ({})",
                    e.id, marker, e.sender, e.subject, e.timestamp
                );
            }
            Ok(())
        }

        Command::Read { id } => {
            let api = connect(&cfg)?;
            let email = api.get_email(id).with_context(|| format!("loading email {id}"))?;
            if let Err(e) = api.update_email(id, &EmailUpdate::mark_read()) {
                warn!("mark read failed: {e}");
            }
            println!("From: {}", email.sender);
            println!("To: {}", email.recipients.join(", "));
            println!("Subject: {}", email.subject);
            println!("Timestamp: {}", email.timestamp);
            println!();
            println!("{}", email.body);
            Ok(())
        }

        Command::Send { to, subject, body } => {
            let api = connect(&cfg)?;
            let outgoing = OutgoingEmail {
                recipients: to,
                subject,
                body,
            };
            match api.send_email(&outgoing).context("sending email")? {
                SendOutcome::Accepted(message) => {
                    println!("{}", message.unwrap_or_else(|| "Email sent".to_string()));
                    Ok(())
                }
                SendOutcome::Rejected(error) => bail!("Error: {error}"),
            }
        }
    }
}

fn connect(cfg: &Config) -> Result<HttpMailApi> {
    let session = match &cfg.user_email {
        Some(user) => session_store::resolve_session(user),
        None => std::env::var(session_store::SESSION_ENV).ok(),
    };
    if session.is_none() {
        warn!("no session found; requests go out unauthenticated");
    }
    let cookie = session.map(|value| SessionCookie {
        name: cfg.session_cookie.clone(),
        value,
    });

    HttpMailApi::new(&cfg.base_url, cookie.as_ref(), cfg.timeout())
        .with_context(|| format!("bad base_url '{}'", cfg.base_url))
}
