//! Transient user notifications.
//!
//! Every CRUD outcome maps to exactly one notification. Notifications are
//! dismissible and age out on their own; they are the whole of the client's
//! failure surface, so nothing here is allowed to panic or block.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays on screen unless dismissed.
const DISPLAY_FOR: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    posted_at: Instant,
}

impl Notification {
    fn new(severity: Severity, message: String) -> Self {
        Self {
            severity,
            message,
            posted_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.posted_at.elapsed() >= DISPLAY_FOR
    }
}

/// FIFO of pending notifications; the head is what renders.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.queue
            .push_back(Notification::new(Severity::Success, message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.queue
            .push_back(Notification::new(Severity::Error, message.into()));
    }

    /// The notification currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&Notification> {
        self.queue.front()
    }

    /// Drop the head, revealing the next queued notification.
    pub fn dismiss(&mut self) {
        self.queue.pop_front();
    }

    /// Age out expired notifications; called once per frame.
    pub fn tick(&mut self) {
        while self.queue.front().is_some_and(Notification::is_expired) {
            self.queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_renders_first_in_first_out() {
        let mut notifications = Notifications::new();
        notifications.success("created");
        notifications.error("failed");

        assert_eq!(notifications.current().unwrap().message, "created");
        notifications.dismiss();
        let head = notifications.current().unwrap();
        assert_eq!(head.message, "failed");
        assert_eq!(head.severity, Severity::Error);
        notifications.dismiss();
        assert!(notifications.current().is_none());
    }

    #[test]
    fn tick_keeps_fresh_notifications() {
        let mut notifications = Notifications::new();
        notifications.success("fresh");
        notifications.tick();
        assert!(notifications.current().is_some());
    }
}
