//! Single-flight, last-write-wins render scheduling.
//!
//! Interactive editors submit scene changes far faster than frames can be
//! rendered. The scheduler keeps at most one render in flight and a single
//! pending slot: a submission made while busy replaces whatever was waiting,
//! and the finished render hands straight over to the newest request. Work is
//! never interrupted; output from a render that was overtaken is reported
//! as [`FrameOutcome::Stale`] so callers can discard it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::scene::RenderRequest;

/// Permission to render one request, handed out by the scheduler.
#[derive(Debug)]
pub struct Ticket {
    request: RenderRequest,
    generation: u64,
}

impl Ticket {
    pub fn request(&self) -> &RenderRequest {
        &self.request
    }

    /// Submission sequence number of this request, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Whether a finished render still reflects the newest submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Current,
    /// A newer request arrived while this one was rendering.
    Stale,
}

#[derive(Debug, Default)]
struct State {
    in_flight: bool,
    pending: Option<Ticket>,
    latest: u64,
}

/// Coalescing render queue with a capacity of one.
#[derive(Debug, Default)]
pub struct RenderScheduler {
    state: Mutex<State>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submits a request.
    ///
    /// Returns a ticket when nothing is rendering, in which case the caller
    /// must render it and then call [`complete`](Self::complete). Otherwise
    /// the request is parked, replacing any request already parked, and
    /// `None` is returned.
    pub fn submit(&self, request: RenderRequest) -> Option<Ticket> {
        let mut state = self.lock();
        state.latest += 1;
        let ticket = Ticket {
            request,
            generation: state.latest,
        };

        if !state.in_flight {
            state.in_flight = true;
            trace!(generation = ticket.generation, "render started");
            return Some(ticket);
        }
        if let Some(dropped) = state.pending.replace(ticket) {
            debug!(generation = dropped.generation, "queued render superseded");
        }
        None
    }

    /// Finishes the render for `ticket`.
    ///
    /// Returns whether its output is still current, plus the parked request
    /// (if any) which the caller must render next.
    pub fn complete(&self, ticket: &Ticket) -> (FrameOutcome, Option<Ticket>) {
        let mut state = self.lock();
        let outcome = if ticket.generation == state.latest {
            FrameOutcome::Current
        } else {
            FrameOutcome::Stale
        };
        let next = state.pending.take();
        if next.is_none() {
            state.in_flight = false;
        }
        trace!(generation = ticket.generation, ?outcome, has_next = next.is_some(), "render finished");
        (outcome, next)
    }

    /// Frees the in-flight slot after a driving caller unwound mid-render.
    ///
    /// The parked request is dropped; its submitter is not waiting on it and
    /// the next submission starts a fresh render.
    fn release(&self) {
        let mut state = self.lock();
        state.in_flight = false;
        let dropped = state.pending.take().map(|ticket| ticket.generation);
        warn!(?dropped, "render loop unwound; in-flight slot released");
    }

    /// True while a render is in flight.
    pub fn is_busy(&self) -> bool {
        self.lock().in_flight
    }

    /// Submits `request` and, if this caller won the in-flight slot, keeps
    /// rendering until no request is parked.
    ///
    /// Every render's output goes to `deliver` unless it went stale.
    /// Returns the number of renders this call executed.
    pub fn submit_and_drive<T>(
        &self,
        request: RenderRequest,
        mut render: impl FnMut(&RenderRequest) -> T,
        mut deliver: impl FnMut(T),
    ) -> usize {
        let mut next = self.submit(request);
        let mut slot = SlotGuard {
            scheduler: self,
            held: next.is_some(),
        };
        let mut renders = 0;
        while let Some(ticket) = next {
            let output = render(ticket.request());
            renders += 1;
            let (outcome, following) = self.complete(&ticket);
            slot.held = following.is_some();
            if outcome == FrameOutcome::Current {
                deliver(output);
            }
            next = following;
        }
        renders
    }
}

/// Releases the in-flight slot if the drive loop unwinds while holding it.
struct SlotGuard<'a> {
    scheduler: &'a RenderScheduler,
    held: bool,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if self.held {
            self.scheduler.release();
        }
    }
}
