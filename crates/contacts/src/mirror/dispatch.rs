//! Fire-and-forget mirror dispatch
//!
//! Each (record, mirror) pair runs on its own named thread. Dispatch returns
//! immediately; outcomes are only logged.

use log::{debug, warn};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::ContactMirror;
use crate::models::ContactRecord;

/// Runs mirrors in the background without awaiting them
pub struct MirrorDispatcher {
    mirrors: Vec<Arc<dyn ContactMirror>>,
    /// Handles of attempts that may still be running
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl MirrorDispatcher {
    pub fn new(mirrors: Vec<Arc<dyn ContactMirror>>) -> Self {
        Self {
            mirrors,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    /// Start a mirror attempt for every configured sink
    pub fn dispatch(&self, record: &ContactRecord) {
        for mirror in &self.mirrors {
            let mirror = Arc::clone(mirror);
            let record = record.clone();
            let thread_name = format!("mirror-{}", mirror.name());

            let spawned = thread::Builder::new().name(thread_name).spawn(move || {
                match mirror.mirror(&record) {
                    Ok(()) => debug!("Mirrored contact {} to {}", record.id, mirror.name()),
                    Err(e) => warn!(
                        "Mirroring contact {} to {} failed: {}",
                        record.id,
                        mirror.name(),
                        e
                    ),
                }
            });

            match spawned {
                Ok(handle) => {
                    if let Ok(mut in_flight) = self.in_flight.lock() {
                        in_flight.retain(|h| !h.is_finished());
                        in_flight.push(handle);
                    }
                }
                Err(e) => warn!("Could not start mirror thread: {}", e),
            }
        }
    }

    /// Wait for every attempt started so far
    ///
    /// Store operations never call this; it exists for shutdown and tests.
    pub fn flush(&self) {
        let handles = match self.in_flight.lock() {
            Ok(mut in_flight) => std::mem::take(&mut *in_flight),
            Err(_) => return,
        };
        for handle in handles {
            if handle.join().is_err() {
                warn!("A mirror thread panicked");
            }
        }
    }
}
