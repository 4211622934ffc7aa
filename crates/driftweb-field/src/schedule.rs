//! Display-synchronized frame scheduling.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Host facility that fires a callback on the next display refresh.
///
/// Every requested token is eventually handed back to
/// [`ParticleField::on_frame`](crate::ParticleField::on_frame) unless it is
/// cancelled first.
pub trait FrameScheduler {
    fn request(&mut self) -> FrameToken;
    fn cancel(&mut self, token: FrameToken);
}

/// A scheduler for hosts that drive frames from their own loop.
///
/// Clones share the same queue, so the host keeps one handle to collect due
/// tokens while the field owns another to request them.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    queue: Rc<RefCell<TickQueue>>,
}

#[derive(Debug, Default)]
struct TickQueue {
    next_id: u64,
    pending: Vec<FrameToken>,
    requested: u64,
    cancelled: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every token due on this tick.
    pub fn take_due(&self) -> Vec<FrameToken> {
        std::mem::take(&mut self.queue.borrow_mut().pending)
    }

    /// Tokens requested and not yet taken or cancelled.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Total number of requests made.
    pub fn requested(&self) -> u64 {
        self.queue.borrow().requested
    }

    /// Total number of cancellations that removed a pending token.
    pub fn cancelled(&self) -> u64 {
        self.queue.borrow().cancelled
    }
}

impl FrameScheduler for TickScheduler {
    fn request(&mut self) -> FrameToken {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        queue.requested += 1;
        let token = FrameToken::new(queue.next_id);
        queue.pending.push(token);
        token
    }

    fn cancel(&mut self, token: FrameToken) {
        let mut queue = self.queue.borrow_mut();
        let before = queue.pending.len();
        queue.pending.retain(|t| *t != token);
        if queue.pending.len() < before {
            queue.cancelled += 1;
        }
    }
}
