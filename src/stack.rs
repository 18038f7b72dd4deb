//! Navigation stack operations
//!
//! Pure in-memory operations over a conversation's window history. The
//! navigator loads the stack, applies one of these, renders, and only then
//! persists the result.

use crate::window::Window;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("navigation stack is empty")]
    Empty,
}

/// What `push` did with the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// Singleton screen already present; stack unchanged
    AlreadyPresent,
}

/// What `pop` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    Popped,
    /// Only the root was left; caller must reset to root
    AtRoot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationStack {
    windows: Vec<Window>,
}

impl NavigationStack {
    pub fn new(root: Window) -> Self {
        Self {
            windows: vec![root],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn contains_screen(&self, screen: &str) -> bool {
        self.windows.iter().any(|w| w.screen == screen)
    }

    pub fn push(&mut self, window: Window) -> PushOutcome {
        if window.singleton && self.contains_screen(&window.screen) {
            return PushOutcome::AlreadyPresent;
        }
        self.windows.push(window);
        PushOutcome::Pushed
    }

    pub fn replace_top(&mut self, window: Window) -> Result<(), StackError> {
        let top = self.windows.last_mut().ok_or(StackError::Empty)?;
        *top = window;
        Ok(())
    }

    pub fn pop(&mut self) -> PopOutcome {
        if self.windows.len() <= 1 {
            return PopOutcome::AtRoot;
        }
        self.windows.pop();
        PopOutcome::Popped
    }

    pub fn top(&self) -> Option<&Window> {
        self.windows.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Window> {
        self.windows.last_mut()
    }

    /// Copy of the top window with assembled controls cleared
    pub fn peek_top(&self) -> Option<Window> {
        self.windows.last().map(|w| {
            let mut copy = w.clone();
            copy.reset_controls();
            copy
        })
    }

    /// True when the top window is the only (root) window
    pub fn at_root(&self) -> bool {
        self.windows.len() == 1
    }
}
