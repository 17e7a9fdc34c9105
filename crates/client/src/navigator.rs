//! Navigation sink: where the session and the guard send the user.

use std::sync::Mutex;

use serde::Serialize;

/// A location plus the state threaded through a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    /// Location the user originally asked for, carried to the login screen.
    pub from: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            from: None,
        }
    }

    pub fn with_origin(path: impl Into<String>, from: Option<String>) -> Self {
        Self {
            path: path.into(),
            from,
        }
    }
}

/// Moves the user between screens. Implemented by the rendering layer.
pub trait Navigator: Send + Sync {
    fn push(&self, to: Location);

    /// Navigate without leaving a history entry (redirects).
    fn replace(&self, to: Location);

    fn current(&self) -> Location;
}

/// In-memory history stack.
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<Location>>,
}

impl History {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![Location::new(start)]),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Pop the current entry; the first entry is never removed.
    pub fn back(&self) -> Location {
        let mut entries = self.lock();
        if entries.len() > 1 {
            entries.pop();
        }
        entries.last().cloned().unwrap_or_else(|| Location::new("/"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Location>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for History {
    fn push(&self, to: Location) {
        tracing::debug!(path = %to.path, "navigate");
        self.lock().push(to);
    }

    fn replace(&self, to: Location) {
        tracing::debug!(path = %to.path, from = ?to.from, "redirect");
        let mut entries = self.lock();
        entries.pop();
        entries.push(to);
    }

    fn current(&self) -> Location {
        self.lock()
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new("/"))
    }
}
