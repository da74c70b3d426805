//! User-visible notifications raised by the gateways.
//!
//! The gateway decides *that* something should be shown; the host decides
//! *how* (toast, status bar, log line). Per-call suppression lets a login
//! form show its own message instead of the generic one.

use std::collections::VecDeque;

use parking_lot::Mutex;
use realmgate_protocol::Domain;

/// Which failure produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Envelope code other than success.
    LogicalFailure,
    /// HTTP 401.
    SessionExpired,
    /// HTTP 403.
    Forbidden,
    /// Network error, timeout, or unexpected status.
    Network,
}

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub domain: Domain,
    pub kind: NoticeKind,
    pub message: String,
}

/// Displays notices to the user.
pub trait Notifier: Send + Sync {
    /// Shows (or queues) a notice.
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log. The default for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Network => {
                tracing::error!(domain = %notice.domain, message = %notice.message, "network failure")
            }
            kind => {
                tracing::warn!(domain = %notice.domain, ?kind, message = %notice.message, "request failed")
            }
        }
    }
}

/// Buffers notices until the host's UI drains them.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: Mutex<VecDeque<Notice>>,
}

impl NoticeQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.pending.lock().drain(..).collect()
    }

    /// Number of pending notices.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        self.pending.lock().push_back(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_queue_drains_in_order() {
        let queue = NoticeQueue::new();
        queue.notify(Notice {
            domain: Domain::Admin,
            kind: NoticeKind::Forbidden,
            message: "first".into(),
        });
        queue.notify(Notice {
            domain: Domain::Public,
            kind: NoticeKind::Network,
            message: "second".into(),
        });

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].message, "second");
        assert!(queue.is_empty());
    }
}
