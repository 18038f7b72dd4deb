//! Widget model: display lines and buttons
//!
//! Pure value objects. Rendering never fails; limits are checked when a
//! window is assembled into an outbound message.

use serde::{Deserialize, Serialize};

/// Which side of the body text the mark (emoji badge) sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkPosition {
    #[default]
    Left,
    Right,
}

/// A single display line: `mark sep text` with the text in bold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextWidget {
    pub mark: String,
    pub text: String,
    #[serde(default)]
    pub mark_position: MarkPosition,
    pub separator: String,
}

impl TextWidget {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            mark: String::new(),
            text: text.into(),
            mark_position: MarkPosition::Left,
            separator: " ".to_string(),
        }
    }

    #[must_use]
    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.mark = mark.into();
        self
    }

    #[must_use]
    pub fn mark_right(mut self) -> Self {
        self.mark_position = MarkPosition::Right;
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Visible text, used for length accounting
    pub fn render(&self) -> String {
        join_mark(&self.mark, &self.separator, &self.text, self.mark_position)
    }

    /// HTML line as sent to the platform
    pub fn render_html(&self) -> String {
        let body = format!("<b>{}</b>", escape_html(&self.text));
        join_mark(
            &escape_html(&self.mark),
            &escape_html(&self.separator),
            &body,
            self.mark_position,
        )
    }
}

/// A labelled value line: `mark text: data end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTextWidget {
    pub mark: String,
    pub text: String,
    pub data: String,
    pub separator: String,
    pub end: String,
}

impl DataTextWidget {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mark: String::new(),
            text: text.into(),
            data: data.into(),
            separator: ": ".to_string(),
            end: String::new(),
        }
    }

    #[must_use]
    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.mark = mark.into();
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    pub fn render(&self) -> String {
        format!(
            "{} {}{}{}{}",
            self.mark, self.text, self.separator, self.data, self.end
        )
    }

    pub fn render_html(&self) -> String {
        format!(
            "{} <b>{}</b>{}<i>{}</i><i>{}</i>",
            escape_html(&self.mark),
            escape_html(&self.text),
            escape_html(&self.separator),
            escape_html(&self.data),
            escape_html(&self.end)
        )
    }
}

/// Any line a window can display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextLine {
    Text(TextWidget),
    Data(DataTextWidget),
}

impl TextLine {
    pub fn render(&self) -> String {
        match self {
            TextLine::Text(w) => w.render(),
            TextLine::Data(w) => w.render(),
        }
    }

    pub fn render_html(&self) -> String {
        match self {
            TextLine::Text(w) => w.render_html(),
            TextLine::Data(w) => w.render_html(),
        }
    }
}

impl From<TextWidget> for TextLine {
    fn from(widget: TextWidget) -> Self {
        TextLine::Text(widget)
    }
}

impl From<DataTextWidget> for TextLine {
    fn from(widget: DataTextWidget) -> Self {
        TextLine::Data(widget)
    }
}

/// An inline button. `action_token` is the only channel back into the router
/// and must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonWidget {
    pub mark: String,
    pub label: String,
    #[serde(default)]
    pub mark_position: MarkPosition,
    pub separator: String,
    pub action_token: String,
}

impl ButtonWidget {
    pub fn new(label: impl Into<String>, action_token: impl Into<String>) -> Self {
        Self {
            mark: String::new(),
            label: label.into(),
            mark_position: MarkPosition::Left,
            separator: " ".to_string(),
            action_token: action_token.into(),
        }
    }

    #[must_use]
    pub fn with_mark(mut self, mark: impl Into<String>) -> Self {
        self.mark = mark.into();
        self
    }

    #[must_use]
    pub fn mark_right(mut self) -> Self {
        self.mark_position = MarkPosition::Right;
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// `(label, action_token)` pair for the platform keyboard
    pub fn render(&self) -> (String, String) {
        let label = join_mark(&self.mark, &self.separator, &self.label, self.mark_position);
        (label, self.action_token.clone())
    }
}

fn join_mark(mark: &str, sep: &str, body: &str, position: MarkPosition) -> String {
    // No dangling separator when there is no mark
    if mark.is_empty() {
        return body.to_string();
    }
    match position {
        MarkPosition::Left => format!("{mark}{sep}{body}"),
        MarkPosition::Right => format!("{body}{sep}{mark}"),
    }
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
