use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, warn};

use crate::domain::email::{Email, EmailId, Mailbox, SendOutcome};
use crate::mail::api::{ApiResult, MailApi};

/// Result of a finished request, tagged with what was asked for.
#[derive(Debug)]
pub enum Outcome {
    Mailbox {
        mailbox: Mailbox,
        result: ApiResult<Vec<Email>>,
    },
    Email {
        id: EmailId,
        result: ApiResult<Email>,
    },
    Sent(ApiResult<SendOutcome>),
    Archived {
        id: EmailId,
        result: ApiResult<()>,
    },
    ReplySource {
        id: EmailId,
        result: ApiResult<Email>,
    },
    /// The job panicked before producing a result.
    Aborted,
}

#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub outcome: Outcome,
}

/// Runs backend calls off the UI thread.
///
/// Each view transition advances the generation and requests are tagged
/// with the value current when they were issued. Only completions carrying
/// the current generation should be applied; older ones belong to a view
/// the user already left.
pub struct Dispatcher {
    api: Arc<dyn MailApi>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    generation: u64,
    in_flight: usize,
    background: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn MailApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            api,
            tx,
            rx,
            generation: 0,
            in_flight: 0,
            background: Vec::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Invalidates everything still in flight.
    pub fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Runs `job` on a worker thread; its outcome comes back through
    /// [`try_next`](Self::try_next) / [`wait_next`](Self::wait_next).
    pub fn request<F>(&mut self, job: F) -> u64
    where
        F: FnOnce(&dyn MailApi) -> Outcome + Send + 'static,
    {
        let generation = self.generation;
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.in_flight += 1;
        thread::spawn(move || {
            // a completion must always arrive or wait_next never returns
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(api.as_ref())))
                .unwrap_or_else(|_| {
                    error!("request worker panicked");
                    Outcome::Aborted
                });
            // receiver lives as long as the dispatcher
            let _ = tx.send(Completion { generation, outcome });
        });
        generation
    }

    /// Fire and forget: the result is logged, never applied to any view.
    pub fn best_effort<F>(&mut self, what: &'static str, job: F)
    where
        F: FnOnce(&dyn MailApi) -> ApiResult<()> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let handle = thread::spawn(move || {
            if let Err(e) = job(api.as_ref()) {
                warn!("{what} failed: {e}");
            }
        });
        self.background.retain(|h| !h.is_finished());
        self.background.push(handle);
    }

    pub fn try_next(&mut self) -> Option<Completion> {
        let c = self.rx.try_recv().ok()?;
        self.in_flight -= 1;
        Some(c)
    }

    /// Blocks until the next completion. `None` when nothing is in flight.
    pub fn wait_next(&mut self) -> Option<Completion> {
        if self.in_flight == 0 {
            return None;
        }
        let c = self.rx.recv().ok()?;
        self.in_flight -= 1;
        Some(c)
    }

    pub fn join_background(&mut self) {
        for handle in self.background.drain(..) {
            if handle.join().is_err() {
                error!("background request panicked");
            }
        }
    }
}
