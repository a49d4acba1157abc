use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::db::Database;
use crate::models::{SortOrder, FILTER_KEY, SORT_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Preferences {
    pub(crate) filter: String,
    pub(crate) sort: SortOrder,
}

/// Saves preferences on a background thread. `submit` never blocks and
/// never fails; write errors are logged and dropped.
pub(crate) struct PreferenceWriter {
    sender: Option<Sender<Preferences>>,
    handle: Option<JoinHandle<()>>,
}

impl PreferenceWriter {
    pub(crate) fn spawn(db: Database) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("preference-writer".into())
            .spawn(move || run(&db, &receiver))
            .context("Failed to start preference writer")?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    pub(crate) fn submit(&self, prefs: Preferences) {
        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(prefs).is_ok());
        if !sent {
            warn!("preference writer is not running; preferences not saved");
        }
    }

    /// Close the queue and wait for pending saves to finish.
    pub(crate) fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("preference writer panicked");
            }
        }
    }
}

impl Drop for PreferenceWriter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(db: &Database, receiver: &Receiver<Preferences>) {
    while let Ok(mut prefs) = receiver.recv() {
        // Only the newest queued value matters.
        while let Ok(newer) = receiver.try_recv() {
            prefs = newer;
        }
        match save(db, &prefs) {
            Ok(()) => debug!(filter = %prefs.filter, sort = prefs.sort.as_str(), "preferences saved"),
            Err(e) => warn!(error = %format!("{e:#}"), "failed to save preferences"),
        }
    }
}

fn save(db: &Database, prefs: &Preferences) -> Result<()> {
    db.set_config(FILTER_KEY, &prefs.filter)?;
    db.set_config(SORT_KEY, prefs.sort.as_str())?;
    Ok(())
}
