use std::collections::VecDeque;

use types::Interrupt;

/// Pending interrupts, drained strictly in arrival order at the top of
/// every clock tick.
#[derive(Debug, Default)]
pub struct InterruptQueue {
    queue: VecDeque<Interrupt>,
}

impl InterruptQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interrupt: Interrupt) {
        self.queue.push_back(interrupt);
    }

    pub fn pop(&mut self) -> Option<Interrupt> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
