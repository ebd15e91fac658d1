use std::time::Duration;

/// Default lifetime of an auto-clearing message.
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
}

/// A deferred clear. Only valid while the slot is still at `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledClear {
    pub generation: u64,
    pub delay: Duration,
}

/// Single visible message plus a generation counter.
///
/// Every transition bumps the generation, so a clear scheduled for an older
/// message is a no-op once anything newer has been shown or cleared.
#[derive(Debug, Clone)]
pub struct FeedbackSlot {
    current: Option<Feedback>,
    generation: u64,
    clear_after: Duration,
}

impl Default for FeedbackSlot {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

impl FeedbackSlot {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            current: None,
            generation: 0,
            clear_after,
        }
    }

    pub fn current(&self) -> Option<&Feedback> {
        self.current.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.text_of(FeedbackKind::Error)
    }

    pub fn success(&self) -> Option<&str> {
        self.text_of(FeedbackKind::Success)
    }

    fn text_of(&self, kind: FeedbackKind) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|f| f.kind == kind)
            .map(|f| f.text.as_str())
    }

    /// Show a message that stays until the next transition.
    pub fn show(&mut self, kind: FeedbackKind, text: impl Into<String>) {
        self.generation += 1;
        self.current = Some(Feedback {
            kind,
            text: text.into(),
        });
    }

    /// Show a message and return the clear the caller must schedule.
    pub fn show_transient(&mut self, kind: FeedbackKind, text: impl Into<String>) -> ScheduledClear {
        self.show(kind, text);
        ScheduledClear {
            generation: self.generation,
            delay: self.clear_after,
        }
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Run a scheduled clear. Returns `true` if it removed the message.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.current.is_none() {
            return false;
        }
        self.clear();
        true
    }
}
