use std::cell::RefCell;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Danger,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Danger => "danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub duration: Duration,
}

/// Fire-and-forget user notifications (the strip at the top of the page).
pub trait Notifier {
    fn notify(&self, kind: NoticeKind, message: &str, duration: Duration);
}

/// Keeps every notice in memory. Used by tests and for headless sessions.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: RefCell<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, kind: NoticeKind, message: &str, duration: Duration) {
        self.notices.borrow_mut().push(Notice { kind, message: message.to_string(), duration });
    }
}
