//! Bounded Event Queue
//!
//! Fixed-capacity FIFO between driver callbacks and the loop. The agent is
//! single-threaded, so this is a plain `heapless::Deque` with an overflow
//! counter rather than an atomic ring buffer. An implementation that delivers
//! callbacks from another thread or an interrupt must wrap the queue in a
//! critical section.
//!
//! ## Overflow Policy
//!
//! When full, the *new* event is dropped and counted. The queue is drained
//! completely every tick, so overflow only happens when the loop stalls, and
//! the events already queued describe what happened first. Transports should
//! stop at `remaining()` and keep the rest for the next tick.
//!
//! ```rust
//! use wiretemp_core::queue::EventQueue;
//! use wiretemp_core::events::{AgentEvent, LinkEvent};
//!
//! let mut queue: EventQueue<2> = EventQueue::new();
//! assert!(queue.push(LinkEvent::LinkDown.into()));
//! assert!(queue.push(LinkEvent::LostAddress.into()));
//! assert!(!queue.push(LinkEvent::LinkDown.into()));
//! assert_eq!(queue.dropped(), 1);
//! assert_eq!(queue.pop(), Some(AgentEvent::Link(LinkEvent::LinkDown)));
//! ```

use heapless::Deque;

use crate::events::AgentEvent;

/// FIFO of pending agent events
pub struct EventQueue<const N: usize> {
    events: Deque<AgentEvent, N>,
    dropped: u32,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
            dropped: 0,
        }
    }

    /// Enqueue an event; returns false if it was dropped
    pub fn push(&mut self, event: AgentEvent) -> bool {
        match self.events.push_back(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.wrapping_add(1);
                false
            }
        }
    }

    /// Dequeue the oldest event
    pub fn pop(&mut self) -> Option<AgentEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.events.is_full()
    }

    /// Free slots before the next push is dropped
    pub fn remaining(&self) -> usize {
        N - self.events.len()
    }

    /// Events lost to overflow since startup
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{InboundMessage, LinkEvent, LinkInfo};

    #[test]
    fn fifo_order() {
        let mut queue: EventQueue<4> = EventQueue::new();
        queue.push(LinkEvent::LinkUp(LinkInfo::default()).into());
        queue.push(InboundMessage::new("a/commands", b"x").into());

        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Some(AgentEvent::Link(LinkEvent::LinkUp(_)))));
        assert!(matches!(queue.pop(), Some(AgentEvent::Inbound(_))));
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_newest() {
        let mut queue: EventQueue<1> = EventQueue::new();
        assert!(queue.push(LinkEvent::LinkDown.into()));
        assert!(!queue.push(LinkEvent::LostAddress.into()));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.pop(), Some(AgentEvent::Link(LinkEvent::LinkDown)));
    }

    #[test]
    fn remaining_tracks_free_slots() {
        let mut queue: EventQueue<3> = EventQueue::new();
        assert_eq!(queue.remaining(), 3);
        queue.push(LinkEvent::LinkDown.into());
        queue.push(LinkEvent::LinkDown.into());
        assert_eq!(queue.remaining(), 1);
        assert!(!queue.is_full());
        queue.push(LinkEvent::LinkDown.into());
        assert!(queue.is_full());
        assert_eq!(queue.remaining(), 0);
    }
}
