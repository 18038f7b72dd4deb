//! Stock windows used by handlers for short-lived screens

use super::{Window, BACK_ACTION};
use crate::widget::{ButtonWidget, TextWidget};

/// A message with a single "Ok" button that returns to the previous screen
pub fn info(text: impl Into<String>) -> Window {
    let mut window = Window::new("info");
    window.back = ButtonWidget::new("Ok", BACK_ACTION);
    window.add_text_row([TextWidget::new(text)]);
    window
}

/// Placeholder shown while a background operation runs; no way back
pub fn temp(text: impl Into<String>) -> Window {
    let mut window = Window::new("temp").without_back();
    window.add_text_row([TextWidget::new(text).with_mark("⏳")]);
    window
}

/// Processing placeholder with the default wording
pub fn processing() -> Window {
    temp("Processing...")
}

/// Prompt for free-text input; `mode` tells the router what the reply means
pub fn input(prompt: impl Into<String>, mode: impl Into<String>) -> Window {
    let mut window = Window::new("input").with_mode(mode);
    window.back_as_cancel();
    window.add_text_row([TextWidget::new(prompt)]);
    window
}

/// Yes/no question. "No" pops back to the previous screen.
pub fn confirm(prompt: impl Into<String>, yes_action: impl Into<String>) -> Window {
    let mut window = Window::new("confirm").without_back();
    window.add_text_row([TextWidget::new(prompt)]);
    window.add_button_row(
        [
            ButtonWidget::new("Yes", yes_action).with_mark("✅"),
            ButtonWidget::new("No", BACK_ACTION).with_mark("❌"),
        ],
        false,
    );
    window
}
