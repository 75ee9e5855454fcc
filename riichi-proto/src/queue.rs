//! A bounded, blocking FIFO queue shared between a connection's reader
//! thread and the session engine that consumes its frames.
//!
//! Ported from `msg::queue<MsgType>` in `utils/message.hpp` (a
//! `std::deque` behind a `std::mutex` plus a `std::condition_variable`),
//! generalized with a capacity bound: a full queue blocks producers the
//! same way an empty queue blocks consumers, instead of growing without
//! limit.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

pub struct MessageQueue<T> {
    capacity: usize,
    state: Mutex<VecDeque<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> MessageQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Blocks until there is room, then appends `item`.
    pub fn push(&self, item: T) {
        let mut queue = self.state.lock().unwrap();
        while queue.len() >= self.capacity {
            queue = self.not_full.wait(queue).unwrap();
        }
        queue.push_back(item);
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available, then removes and returns it.
    pub fn pop(&self) -> T {
        let mut queue = self.state.lock().unwrap();
        while queue.is_empty() {
            queue = self.not_empty.wait(queue).unwrap();
        }
        let item = queue.pop_front().expect("checked non-empty under lock");
        self.not_full.notify_one();
        item
    }

    /// Blocks until an item is available or `timeout` elapses, whichever
    /// comes first. Used by the session engine's self-call/opponent-call
    /// windows, which must give up and fall back to a default action
    /// rather than block forever on a silent client.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.state.lock().unwrap();
        while queue.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, result) = self.not_empty.wait_timeout(queue, remaining).unwrap();
            queue = guard;
            if result.timed_out() && queue.is_empty() {
                return None;
            }
        }
        let item = queue.pop_front().expect("checked non-empty under lock");
        self.not_full.notify_one();
        Some(item)
    }

    /// Non-blocking pop, for a reconnect/shutdown drain path.
    pub fn try_pop(&self) -> Option<T> {
        let mut queue = self.state.lock().unwrap();
        let item = queue.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    pub fn flush(&self) {
        let mut queue = self.state.lock().unwrap();
        queue.clear();
        self.not_full.notify_all();
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn push_then_pop_preserves_order() {
        let q = MessageQueue::new(4);
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.pop(), 1);
        assert_eq!(q.pop(), 2);
        assert_eq!(q.pop(), 3);
    }

    #[test]
    fn pop_timeout_returns_none_when_nothing_arrives() {
        let q: MessageQueue<i32> = MessageQueue::new(4);
        assert_eq!(q.pop_timeout(Duration::from_millis(20)), None);
    }

    #[test]
    fn pop_timeout_returns_item_pushed_during_the_wait() {
        let q = Arc::new(MessageQueue::new(4));
        let q2 = q.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            q2.push(7);
        });
        assert_eq!(q.pop_timeout(Duration::from_millis(500)), Some(7));
        handle.join().unwrap();
    }

    #[test]
    fn flush_empties_and_wakes_waiting_producers() {
        let q = Arc::new(MessageQueue::new(1));
        q.push(1);
        let q2 = q.clone();
        let handle = thread::spawn(move || {
            q2.push(2); // blocks: capacity 1, already full
        });
        thread::sleep(Duration::from_millis(20));
        q.flush();
        handle.join().unwrap();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn pop_blocks_until_an_item_is_pushed() {
        let q = Arc::new(MessageQueue::new(4));
        let q2 = q.clone();
        let handle = thread::spawn(move || q2.pop());
        thread::sleep(Duration::from_millis(20));
        q.push(42);
        assert_eq!(handle.join().unwrap(), 42);
    }
}
