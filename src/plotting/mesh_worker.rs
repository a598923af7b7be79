//! Background mesh extraction with stale-result suppression.
//!
//! Every submitted request carries a generation tag. Editing or deleting
//! an equation bumps the generation, so a slow extraction finishing after
//! a newer submit is recognised as stale at the poll site and dropped.
//! Meshing itself runs on a detached thread per request; results come back
//! over a channel.

use crate::plotting::isosurface::{MeshData, extract_isosurface};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::{Duration, Instant};

/// Everything needed to extract one surface.
#[derive(Debug, Clone)]
pub struct MeshRequest {
    pub left: String,
    pub right: String,
    pub size: usize,
    pub range: f64,
    pub scope: HashMap<String, f64>,
}

/// A finished extraction, tagged with the generation it was submitted under.
#[derive(Debug)]
pub struct MeshResponse {
    pub generation: u64,
    pub mesh: MeshData,
}

pub struct MeshWorker {
    generation: Arc<AtomicU64>,
    sender: Sender<MeshResponse>,
    receiver: Receiver<MeshResponse>,
}

impl Default for MeshWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshWorker {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            sender,
            receiver,
        }
    }

    /// Supersedes any in-flight request and starts a new extraction.
    /// Returns the generation tag of the new request.
    pub fn submit(&self, request: MeshRequest) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let sender = self.sender.clone();
        let current = Arc::clone(&self.generation);

        thread::spawn(move || {
            let mesh = extract_isosurface(
                &request.left,
                &request.right,
                request.size,
                request.range,
                &request.scope,
            );
            // skip the send if a newer submit already superseded us
            if current.load(Ordering::SeqCst) != generation {
                log::trace!("discarding stale mesh for generation {generation}");
                return;
            }
            // receiver may be gone if the worker was dropped
            let _ = sender.send(MeshResponse { generation, mesh });
        });

        generation
    }

    /// Invalidates all in-flight requests without starting a new one.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Drains the channel and returns the newest mesh that is still
    /// current, if any arrived since the last poll.
    pub fn poll(&self) -> Option<MeshData> {
        let current = self.generation.load(Ordering::SeqCst);
        let mut latest = None;
        while let Ok(response) = self.receiver.try_recv() {
            if response.generation == current {
                latest = Some(response.mesh);
            } else {
                log::trace!(
                    "dropping mesh from generation {} (current {current})",
                    response.generation
                );
            }
        }
        latest
    }

    /// Blocks until a current-generation mesh arrives or the deadline
    /// passes. Stale responses received in the meantime are discarded.
    pub fn wait(&self, timeout: Duration) -> Option<MeshData> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let response = self.receiver.recv_timeout(remaining).ok()?;
            if response.generation == self.generation.load(Ordering::SeqCst) {
                return Some(response.mesh);
            }
        }
    }
}

/// Coalesces bursts of re-mesh triggers: a trigger only fires once the
/// window has elapsed since it was armed. Time is passed in explicitly so
/// the policy is testable without sleeping.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    armed_at: Option<Instant>,
}

impl Debounce {
    pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60);

    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// Registers a trigger at `now`. Re-triggering while armed restarts
    /// the window.
    pub fn trigger(&mut self, now: Instant) {
        self.armed_at = Some(now);
    }

    /// True exactly once per armed window, after it has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.armed_at {
            Some(at) if now.duration_since(at) >= self.window => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed_at.is_some()
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_request(scale: f64) -> MeshRequest {
        MeshRequest {
            left: "x^2+y^2+z^2".to_string(),
            right: scale.to_string(),
            size: 20,
            range: 5.0,
            scope: HashMap::new(),
        }
    }

    #[test]
    fn test_submit_and_wait_returns_mesh() {
        let worker = MeshWorker::new();
        worker.submit(sphere_request(1.0));
        let mesh = worker.wait(Duration::from_secs(10)).expect("mesh");
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_cancel_discards_in_flight_result() {
        let worker = MeshWorker::new();
        worker.submit(sphere_request(1.0));
        worker.cancel();
        assert!(worker.wait(Duration::from_millis(500)).is_none());
    }

    #[test]
    fn test_resubmit_supersedes_previous_generation() {
        let worker = MeshWorker::new();
        let first = worker.submit(sphere_request(1.0));
        let second = worker.submit(sphere_request(4.0));
        assert!(second > first);

        // only the second request's mesh may come back; its sphere has
        // radius 2 so any vertex is far from radius 1
        let mesh = worker.wait(Duration::from_secs(10)).expect("mesh");
        for p in &mesh.positions {
            assert!((p.coords.norm() - 2.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_poll_returns_nothing_before_completion() {
        let worker = MeshWorker::new();
        assert!(worker.poll().is_none());
    }

    #[test]
    fn test_debounce_coalesces_rapid_triggers() {
        let mut debounce = Debounce::default();
        let t0 = Instant::now();
        debounce.trigger(t0);
        debounce.trigger(t0 + Duration::from_millis(20));
        debounce.trigger(t0 + Duration::from_millis(40));

        // window restarts at the last trigger
        assert!(!debounce.fire(t0 + Duration::from_millis(70)));
        assert!(debounce.fire(t0 + Duration::from_millis(101)));
        // fires once per burst
        assert!(!debounce.fire(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn test_debounce_idle_never_fires() {
        let mut debounce = Debounce::default();
        assert!(!debounce.is_armed());
        assert!(!debounce.fire(Instant::now()));
    }
}
