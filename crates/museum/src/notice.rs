use crate::prelude::*;

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    remaining: Duration,
}

impl Notice {
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Short-lived messages shown on top of the viewport
#[derive(Resource, Debug)]
pub struct Notices {
    entries: Vec<Notice>,
    ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();

        // A repeated message refreshes the existing entry instead of stacking
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|notice| notice.level == level && notice.message == message)
        {
            existing.remaining = self.ttl;
            return;
        }

        self.entries.push(Notice {
            level,
            message,
            remaining: self.ttl,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Age every notice by `elapsed` and drop the expired ones
    pub fn expire(&mut self, elapsed: Duration) {
        self.entries.retain_mut(|notice| {
            notice.remaining = notice.remaining.saturating_sub(elapsed);
            !notice.remaining.is_zero()
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
