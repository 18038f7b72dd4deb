//! Window: one renderable chat screen
//!
//! A window carries author content (text lines and button rows) plus the
//! pagination source and back-navigation flag. The navigation controls
//! (page slice, flip buttons, back button) are assembled in three guarded
//! stages so the same window can be rendered any number of times without
//! duplicating them.

pub mod presets;

use crate::widget::{ButtonWidget, TextLine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform limit on visible text / caption length, in characters
pub const MAX_TEXT_CHARS: usize = 1024;
/// Platform limit on inline buttons per message
pub const MAX_BUTTONS: usize = 100;
/// Widest keyboard row
pub const MAX_ROW_WIDTH: usize = 8;
/// Widest keyboard row when every label is a bare emoji
pub const MAX_EMOJI_ROW_WIDTH: usize = 4;

pub const BACK_ACTION: &str = "back";
pub const FLIP_LEFT_ACTION: &str = "flip_left";
pub const FLIP_RIGHT_ACTION: &str = "flip_right";

/// Shown when a text window has no lines at all
pub const EMPTY_TEXT: &str = "No Data";

const DEFAULT_PAGE_SIZE: usize = 10;

/// How the window is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Text,
    Photo,
    Voice,
}

impl WindowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowKind::Text => "text",
            WindowKind::Photo => "photo",
            WindowKind::Voice => "voice",
        }
    }
}

/// A window that cannot be turned into a platform message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("text is {len} characters, limit is {}", MAX_TEXT_CHARS)]
    TextTooLong { len: usize },
    #[error("window has {count} buttons, limit is {}", MAX_BUTTONS)]
    TooManyButtons { count: usize },
    #[error("button `{label}` has an empty action token")]
    EmptyActionToken { label: String },
    #[error("{kind} window has no media and no placeholder is configured")]
    MissingMedia { kind: &'static str },
}

/// Fallback attachments for media windows built without one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPlaceholders {
    pub photo: Option<String>,
    pub voice: Option<String>,
}

/// One keyboard button as sent to the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub action_token: String,
}

/// Fully assembled message content for the delivery API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    pub kind: WindowKind,
    /// HTML text for text windows, caption for media windows
    pub text: String,
    pub media: Option<String>,
    pub keyboard: Vec<Vec<InlineButton>>,
}

/// Per-render control assembly state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Controls {
    rows: Vec<Vec<ButtonWidget>>,
    paged: bool,
    flipped: bool,
    back: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    /// Logical screen type, compared by the singleton rule
    pub screen: String,
    pub singleton: bool,
    pub kind: WindowKind,
    /// Conversation mode marker applied once this window is live
    pub mode: Option<String>,
    pub media: Option<String>,
    pub text_lines: Vec<TextLine>,
    pub button_rows: Vec<Vec<ButtonWidget>>,
    pub page_items: Vec<ButtonWidget>,
    pub page_size: usize,
    pub buttons_per_line: usize,
    pub page_index: i64,
    pub allow_back: bool,
    pub back: ButtonWidget,
    pub flip_left: ButtonWidget,
    pub flip_right: ButtonWidget,
    #[serde(default)]
    controls: Controls,
}

impl Window {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            singleton: false,
            kind: WindowKind::Text,
            mode: None,
            media: None,
            text_lines: Vec::new(),
            button_rows: Vec::new(),
            page_items: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            buttons_per_line: 1,
            page_index: 0,
            allow_back: true,
            back: ButtonWidget::new("⬇", BACK_ACTION),
            flip_left: ButtonWidget::new("⬅", FLIP_LEFT_ACTION).with_separator(""),
            flip_right: ButtonWidget::new("➡", FLIP_RIGHT_ACTION).with_separator(""),
            controls: Controls::default(),
        }
    }

    pub fn photo(screen: impl Into<String>, media: Option<String>) -> Self {
        let mut window = Self::new(screen);
        window.kind = WindowKind::Photo;
        window.media = media;
        window
    }

    pub fn voice(screen: impl Into<String>, media: Option<String>) -> Self {
        let mut window = Self::new(screen);
        window.kind = WindowKind::Voice;
        window.media = media;
        window
    }

    #[must_use]
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn without_back(mut self) -> Self {
        self.allow_back = false;
        self
    }

    #[must_use]
    pub fn paginate(mut self, items: Vec<ButtonWidget>, page_size: usize, per_line: usize) -> Self {
        self.page_items = items;
        self.page_size = page_size;
        self.buttons_per_line = per_line;
        self
    }

    /// Relabel the back button as a cancel button
    pub fn back_as_cancel(&mut self) {
        self.back = ButtonWidget::new("Cancel", BACK_ACTION).with_mark("❌");
    }

    pub fn add_text_row(&mut self, lines: impl IntoIterator<Item = impl Into<TextLine>>) {
        self.text_lines.extend(lines.into_iter().map(Into::into));
    }

    /// Start a new row; buttons past the column limit wrap onto further rows.
    pub fn add_button_row(&mut self, buttons: impl IntoIterator<Item = ButtonWidget>, emoji_only: bool) {
        push_rows(&mut self.button_rows, buttons, row_width(emoji_only));
    }

    /// Append to the last row, wrapping into new rows at the column limit.
    pub fn extend_last_row(&mut self, buttons: impl IntoIterator<Item = ButtonWidget>, emoji_only: bool) {
        let width = row_width(emoji_only);
        for button in buttons {
            match self.button_rows.last_mut() {
                Some(row) if row.len() < width => row.push(button),
                _ => self.button_rows.push(vec![button]),
            }
        }
    }

    /// One button per row
    pub fn add_button_column(&mut self, buttons: impl IntoIterator<Item = ButtonWidget>) {
        self.button_rows.extend(buttons.into_iter().map(|b| vec![b]));
    }

    /// Number of pages `page_items` splits into; never zero
    pub fn page_count(&self) -> usize {
        self.page_items.len().div_ceil(self.page_size.max(1)).max(1)
    }

    /// The page currently shown, with `page_index` taken modulo the page count
    pub fn paginated_slice(&self) -> &[ButtonWidget] {
        let size = self.page_size.max(1);
        let page = current_page(self.page_index, self.page_count());
        let start = page * size;
        let end = (start + size).min(self.page_items.len());
        self.page_items.get(start..end).unwrap_or_default()
    }

    /// Move `delta` pages, wrapping around. Clears assembled controls.
    pub fn flip(&mut self, delta: i64) {
        let count = i128::try_from(self.page_count()).unwrap_or(i128::MAX);
        let next = (i128::from(self.page_index) + i128::from(delta)).rem_euclid(count);
        self.page_index = i64::try_from(next).unwrap_or(0);
        self.reset_controls();
    }

    /// Drop assembled controls so the next render rebuilds them
    pub fn reset_controls(&mut self) {
        self.controls = Controls::default();
    }

    /// Append page slice, flip row and back row. Each stage runs once.
    pub fn render_controls(&mut self) {
        if !self.controls.paged {
            let per_line = self.buttons_per_line.clamp(1, MAX_ROW_WIDTH);
            let slice = self.paginated_slice().to_vec();
            for chunk in slice.chunks(per_line) {
                self.controls.rows.push(chunk.to_vec());
            }
            self.controls.paged = true;
        }
        if !self.controls.flipped {
            if self.page_count() > 1 {
                self.controls
                    .rows
                    .push(vec![self.flip_left.clone(), self.flip_right.clone()]);
            }
            self.controls.flipped = true;
        }
        if !self.controls.back {
            if self.allow_back {
                self.controls.rows.push(vec![self.back.clone()]);
            }
            self.controls.back = true;
        }
    }

    /// Assemble controls and build the outbound message, enforcing limits.
    pub fn assemble(&mut self, placeholders: &MediaPlaceholders) -> Result<MessageContent, WindowError> {
        self.render_controls();

        let plain = self
            .text_lines
            .iter()
            .map(TextLine::render)
            .collect::<Vec<_>>()
            .join("\n");
        let len = plain.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(WindowError::TextTooLong { len });
        }

        let text = if self.text_lines.is_empty() {
            match self.kind {
                WindowKind::Text => EMPTY_TEXT.to_string(),
                WindowKind::Photo | WindowKind::Voice => String::new(),
            }
        } else {
            self.text_lines
                .iter()
                .map(TextLine::render_html)
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut keyboard = Vec::new();
        let mut count = 0;
        for row in self.button_rows.iter().chain(self.controls.rows.iter()) {
            if row.is_empty() {
                continue;
            }
            let mut out = Vec::with_capacity(row.len());
            for button in row {
                if button.action_token.is_empty() {
                    return Err(WindowError::EmptyActionToken {
                        label: button.label.clone(),
                    });
                }
                let (label, action_token) = button.render();
                out.push(InlineButton { label, action_token });
            }
            count += out.len();
            keyboard.push(out);
        }
        if count > MAX_BUTTONS {
            return Err(WindowError::TooManyButtons { count });
        }

        let media = match self.kind {
            WindowKind::Text => None,
            WindowKind::Photo => Some(
                self.media
                    .clone()
                    .or_else(|| placeholders.photo.clone())
                    .ok_or(WindowError::MissingMedia { kind: "photo" })?,
            ),
            WindowKind::Voice => Some(
                self.media
                    .clone()
                    .or_else(|| placeholders.voice.clone())
                    .ok_or(WindowError::MissingMedia { kind: "voice" })?,
            ),
        };

        Ok(MessageContent {
            kind: self.kind,
            text,
            media,
            keyboard,
        })
    }
}

fn row_width(emoji_only: bool) -> usize {
    if emoji_only {
        MAX_EMOJI_ROW_WIDTH
    } else {
        MAX_ROW_WIDTH
    }
}

fn push_rows(rows: &mut Vec<Vec<ButtonWidget>>, buttons: impl IntoIterator<Item = ButtonWidget>, width: usize) {
    let mut row = Vec::new();
    for button in buttons {
        if row.len() == width {
            rows.push(std::mem::take(&mut row));
        }
        row.push(button);
    }
    rows.push(row);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn current_page(page_index: i64, count: usize) -> usize {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    usize::try_from(page_index.rem_euclid(count)).unwrap_or(0)
}
