// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sequence stamps for view responses.
//!
//! Each fetch takes a [`Ticket`] before it starts. When it resolves, the view
//! asks the gate whether to apply it: responses are dropped once the view has
//! been deactivated, and when a newer response has already been applied.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Stamp handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct ResponseGate {
    issued: AtomicU64,
    applied: AtomicU64,
    active: AtomicBool,
}

impl Default for ResponseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseGate {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            active: AtomicBool::new(true),
        }
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Decide whether the response for `ticket` may be applied, and record it.
    ///
    /// Must be called while holding the lock guarding the view state the
    /// response is written into.
    pub fn admit(&self, ticket: Ticket) -> bool {
        if !self.is_active() {
            return false;
        }
        self.applied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |applied| {
                (ticket.0 > applied).then_some(ticket.0)
            })
            .is_ok()
    }

    /// True if no request was issued after `ticket`.
    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Mark the view as gone; every later response is ignored.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
