//! Timed status-bar messages

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel, duration: Duration) -> Self {
        let now = Instant::now();
        Self {
            message: message.into(),
            level,
            created_at: now,
            expires_at: now + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn time_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Newest-first stack of messages; the status bar shows the first one
#[derive(Debug)]
pub struct NotificationManager {
    notifications: Vec<Notification>,
    default_duration: Duration,
    error_duration: Duration,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::with_durations(Duration::from_secs(3), Duration::from_secs(8))
    }

    pub fn with_durations(default_duration: Duration, error_duration: Duration) -> Self {
        Self {
            notifications: Vec::new(),
            default_duration,
            error_duration,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let duration = match level {
            NotificationLevel::Error => self.error_duration,
            _ => self.default_duration,
        };
        self.notify_for(message, level, duration);
    }

    pub fn notify_for(
        &mut self,
        message: impl Into<String>,
        level: NotificationLevel,
        duration: Duration,
    ) {
        self.notifications
            .insert(0, Notification::new(message, level, duration));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Info);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Warning);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Error);
    }

    /// Remove expired notifications, returns true if any were removed
    pub fn update(&mut self) -> bool {
        let initial_len = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired());
        self.notifications.len() != initial_len
    }

    pub fn current(&self) -> Option<&Notification> {
        self.notifications.first()
    }

    pub fn dismiss_current(&mut self) -> bool {
        if self.notifications.is_empty() {
            false
        } else {
            self.notifications.remove(0);
            true
        }
    }

    pub fn clear(&mut self) {
        self.notifications.clear();
    }

    pub fn count(&self) -> usize {
        self.notifications.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn notification_expiration() {
        let notification =
            Notification::new("test", NotificationLevel::Info, Duration::from_millis(50));
        assert!(!notification.is_expired());

        thread::sleep(Duration::from_millis(60));
        assert!(notification.is_expired());
        assert_eq!(notification.time_remaining(), Duration::ZERO);
    }

    #[test]
    fn newest_message_is_current() {
        let mut manager = NotificationManager::new();
        manager.info("Opened");
        manager.error("Cannot open report.pdf");

        assert_eq!(manager.count(), 2);
        let current = manager.current().unwrap();
        assert_eq!(current.message, "Cannot open report.pdf");
        assert_eq!(current.level, NotificationLevel::Error);

        assert!(manager.dismiss_current());
        assert_eq!(manager.current().unwrap().message, "Opened");
    }

    #[test]
    fn errors_outlive_info_messages() {
        let mut manager =
            NotificationManager::with_durations(Duration::from_millis(10), Duration::from_secs(60));
        manager.error("bad");
        manager.info("fine");

        thread::sleep(Duration::from_millis(30));
        assert!(manager.update());
        assert_eq!(manager.count(), 1);
        assert_eq!(manager.current().unwrap().level, NotificationLevel::Error);
        assert!(!manager.update());
    }
}
