//! Async timestep loading with stale-result rejection.
//!
//! Fetches run on a tokio runtime owned by the loader and report back over
//! an mpsc channel that the frame loop polls without blocking. Every request
//! bumps a generation counter; a result tagged with an older generation
//! arrived after a newer request and is dropped.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::core::{Error, Result};
use crate::field::WindRaster;
use crate::streaming::asset_io::{AssetSource, TimestepId};

/// Message from a fetch task back to the loader.
struct Completion {
    generation: u64,
    id: TimestepId,
    result: Result<WindRaster>,
}

/// Outcome of the most recent request.
#[derive(Debug)]
pub enum LoadEvent {
    Ready { id: TimestepId, raster: Arc<WindRaster> },
    Failed { id: TimestepId, error: Error },
}

/// Loads timesteps from an [`AssetSource`] in the background.
pub struct TimestepLoader<S: AssetSource> {
    source: Arc<S>,
    result_tx: mpsc::UnboundedSender<Completion>,
    result_rx: mpsc::UnboundedReceiver<Completion>,
    /// Generation of the latest request
    generation: u64,
    pending: Option<TimestepId>,
    runtime: Runtime,
}

impl<S: AssetSource> TimestepLoader<S> {
    /// Create a loader with its own multi-threaded runtime.
    pub fn new(source: S) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("windmap-loader")
            .enable_all()
            .build()?;
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        Ok(Self {
            source: Arc::new(source),
            result_tx,
            result_rx,
            generation: 0,
            pending: None,
            runtime,
        })
    }

    /// Start fetching `id`. Any earlier request still in flight becomes stale.
    /// Returns the generation assigned to this request.
    pub fn request(&mut self, id: TimestepId) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        debug!("Requesting timestep {} (generation {})", id, generation);

        let source = self.source.clone();
        let tx = self.result_tx.clone();
        let task_id = id.clone();
        self.runtime.spawn(async move {
            let result = source.fetch(&task_id).await;
            // Receiver gone means the loader was dropped
            let _ = tx.send(Completion { generation, id: task_id, result });
        });

        self.pending = Some(id);
        generation
    }

    /// Invalidate whatever is in flight; its result will be discarded.
    pub fn cancel(&mut self) {
        if let Some(id) = self.pending.take() {
            debug!("Cancelled timestep {}", id);
        }
        self.generation += 1;
    }

    /// Non-blocking: the outcome of the latest request if it has arrived.
    /// Stale completions found along the way are discarded.
    pub fn poll(&mut self) -> Option<LoadEvent> {
        let mut event = None;
        while let Ok(done) = self.result_rx.try_recv() {
            if let Some(e) = self.accept(done) {
                event = Some(e);
            }
        }
        event
    }

    /// Block until the latest request completes or `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadEvent> {
        if let Some(event) = self.poll() {
            return Some(event);
        }
        self.pending.as_ref()?;

        let deadline = tokio::time::Instant::now() + timeout;
        let rx = &mut self.result_rx;
        let current = self.generation;
        let mut stale = Vec::new();
        let done = self.runtime.block_on(async {
            loop {
                match tokio::time::timeout_at(deadline, rx.recv()).await {
                    Ok(Some(done)) if done.generation == current => return Some(done),
                    Ok(Some(done)) => stale.push(done),
                    Ok(None) | Err(_) => return None,
                }
            }
        });
        for s in stale {
            self.accept(s);
        }
        done.and_then(|d| self.accept(d))
    }

    /// Filter a completion against the current generation.
    fn accept(&mut self, done: Completion) -> Option<LoadEvent> {
        if done.generation != self.generation {
            debug!(
                "Discarding stale timestep {} (generation {}, current {})",
                done.id, done.generation, self.generation
            );
            return None;
        }
        self.pending = None;
        match done.result {
            Ok(raster) => {
                debug!("Timestep {} ready ({}x{})", done.id, raster.width(), raster.height());
                Some(LoadEvent::Ready { id: done.id, raster: Arc::new(raster) })
            }
            Err(error) => {
                warn!("Timestep {} failed: {}", done.id, error);
                Some(LoadEvent::Failed { id: done.id, error })
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&TimestepId> {
        self.pending.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
