//! Navigation history with back/forward support.

use std::path::PathBuf;

/// Default number of directories remembered in each direction.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Immutable, bounded navigation history with back/forward stacks.
///
/// Every mutation returns a **new** `History` instance. Pushing a new path
/// clears the forward stack (same semantics as a web browser). When a stack
/// exceeds the limit the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct History {
    back_stack: Vec<PathBuf>,
    forward_stack: Vec<PathBuf>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history remembering at most `limit` paths per direction.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            back_stack: Vec::new(),
            forward_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records `left` (the directory being left) and clears the forward stack.
    pub fn push(&self, left: PathBuf) -> Self {
        Self {
            back_stack: bounded_push(&self.back_stack, left, self.limit),
            forward_stack: Vec::new(),
            limit: self.limit,
        }
    }

    /// Steps back from `current`. Returns the new history and the directory to
    /// go to, or `None` if there is nothing to go back to.
    pub fn go_back(&self, current: PathBuf) -> Option<(Self, PathBuf)> {
        let mut back_stack = self.back_stack.clone();
        let target = back_stack.pop()?;
        let history = Self {
            back_stack,
            forward_stack: bounded_push(&self.forward_stack, current, self.limit),
            limit: self.limit,
        };
        Some((history, target))
    }

    /// Steps forward from `current`; the mirror image of [`History::go_back`].
    pub fn go_forward(&self, current: PathBuf) -> Option<(Self, PathBuf)> {
        let mut forward_stack = self.forward_stack.clone();
        let target = forward_stack.pop()?;
        let history = Self {
            back_stack: bounded_push(&self.back_stack, current, self.limit),
            forward_stack,
            limit: self.limit,
        };
        Some((history, target))
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }
}

fn bounded_push(stack: &[PathBuf], path: PathBuf, limit: usize) -> Vec<PathBuf> {
    let skip = (stack.len() + 1).saturating_sub(limit);
    let mut next: Vec<PathBuf> = stack.iter().skip(skip).cloned().collect();
    next.push(path);
    next
}
