use std::time::{Duration, Instant};

pub const DEFAULT_TOGGLE_COOLDOWN: Duration = Duration::from_millis(120);

/// What a pointer release on the anchor turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// The pointer travelled past the drag threshold; open state is untouched.
    Drag,
    /// A second toggle arrived inside the cooldown window.
    Suppressed,
    Toggled { open: bool },
}

/// Decides between click and drag for gestures on the anchor, and owns the
/// open/hover state of the menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arbiter {
    pub open: bool,
    pub hovered: Option<usize>,
    cooldown: Duration,
    cooldown_until: Option<Instant>,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(DEFAULT_TOGGLE_COOLDOWN)
    }
}

impl Arbiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            open: false,
            hovered: None,
            cooldown,
            cooldown_until: None,
        }
    }

    pub fn set_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    /// Resolves a release (or a synthesized click) of the gesture that just ended.
    pub fn release(&mut self, moved_beyond_threshold: bool, now: Instant) -> Gesture {
        if moved_beyond_threshold {
            return Gesture::Drag;
        }
        if self.cooldown_until.is_some_and(|until| now < until) {
            return Gesture::Suppressed;
        }

        self.open = !self.open;
        if !self.open {
            self.hovered = None;
        }
        self.cooldown_until = Some(now + self.cooldown);
        Gesture::Toggled { open: self.open }
    }

    pub fn hover(&mut self, index: Option<usize>) -> bool {
        let index = index.filter(|_| self.open);
        let changed = self.hovered != index;
        self.hovered = index;
        changed
    }

    /// Closes the menu and returns the index that should be activated, if the
    /// menu was open.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if !self.open {
            return None;
        }
        self.close();
        Some(index)
    }

    pub fn close(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        self.hovered = None;
        was_open
    }
}
