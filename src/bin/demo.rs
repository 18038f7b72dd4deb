//! Window Stack demo
//!
//! Runs a scripted navigation session against a console "platform" that
//! prints every delivery call, with state kept in SQLite.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use window_stack::delivery::{DeleteOutcome, EditOutcome, Keyboard};
use window_stack::window::presets;
use window_stack::{
    ButtonWidget, ConversationId, DataTextWidget, DeliveryApi, DeliveryError, FlipDirection,
    LoggingDelivery, MessageDriver, MessageId, NavConfig, Navigator, SqliteStore,
    StaticRootWindows, TextWidget, TokioCleanupScheduler, Window, WindowKind,
};

/// Prints delivery calls instead of talking to a chat platform
#[derive(Default)]
struct ConsoleDelivery {
    next_id: AtomicI64,
}

impl ConsoleDelivery {
    fn allocate(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn print_keyboard(keyboard: &Keyboard) {
    for row in keyboard {
        let labels: Vec<_> = row.iter().map(|b| format!("[{}]", b.label)).collect();
        println!("    {}", labels.join(" "));
    }
}

#[async_trait]
impl DeliveryApi for ConsoleDelivery {
    async fn send_text(
        &self,
        conv: ConversationId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let id = self.allocate();
        println!("[{conv}] send #{id}:\n{text}");
        print_keyboard(keyboard);
        Ok(id)
    }

    async fn send_photo(
        &self,
        conv: ConversationId,
        photo: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let id = self.allocate();
        println!("[{conv}] send photo #{id} ({photo}):\n{caption}");
        print_keyboard(keyboard);
        Ok(id)
    }

    async fn send_voice(
        &self,
        conv: ConversationId,
        voice: &str,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageId, DeliveryError> {
        let id = self.allocate();
        println!("[{conv}] send voice #{id} ({voice}):\n{caption}");
        print_keyboard(keyboard);
        Ok(id)
    }

    async fn edit_text(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        println!("[{conv}] edit #{message_id}:\n{text}");
        print_keyboard(keyboard);
        Ok(EditOutcome::Edited)
    }

    async fn edit_media(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        kind: WindowKind,
        media: &str,
    ) -> Result<EditOutcome, DeliveryError> {
        println!("[{conv}] swap {} of #{message_id} -> {media}", kind.as_str());
        Ok(EditOutcome::Edited)
    }

    async fn edit_caption(
        &self,
        conv: ConversationId,
        message_id: MessageId,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<EditOutcome, DeliveryError> {
        println!("[{conv}] caption #{message_id}:\n{caption}");
        print_keyboard(keyboard);
        Ok(EditOutcome::Edited)
    }

    async fn delete_message(
        &self,
        conv: ConversationId,
        message_id: MessageId,
    ) -> Result<DeleteOutcome, DeliveryError> {
        println!("[{conv}] delete #{message_id}");
        Ok(DeleteOutcome::Deleted)
    }
}

fn main_menu() -> Window {
    let mut window = Window::new("main_menu").singleton().without_back();
    window.add_text_row([TextWidget::new("Main menu").with_mark("🏠")]);
    window.add_button_row(
        [
            ButtonWidget::new("Shop", "open_shop").with_mark("🛒"),
            ButtonWidget::new("Profile", "open_profile").with_mark("👤"),
        ],
        false,
    );
    window
}

fn group_menu() -> Window {
    let mut window = Window::new("group_menu").singleton().without_back();
    window.add_text_row([TextWidget::new("Group commands")]);
    window
}

fn shop() -> Window {
    let items = (1..=23)
        .map(|i| ButtonWidget::new(format!("Item {i}"), format!("buy:{i}")))
        .collect();
    let mut window = Window::new("shop").paginate(items, 6, 2);
    window.add_text_row([TextWidget::new("Shop").with_mark("🛒")]);
    window
}

fn profile() -> Window {
    let mut window = Window::new("profile").singleton();
    window.add_text_row([
        DataTextWidget::new("Name", "demo").with_mark("👤"),
        DataTextWidget::new("Balance", "42").with_end(" coins"),
    ]);
    window
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "window_stack=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = NavConfig::from_env();

    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!(path = %config.db_path, "Opening database");
    let store = SqliteStore::open(&config.db_path)?;

    let delivery = Arc::new(LoggingDelivery::new(ConsoleDelivery::default()));
    let scheduler = Arc::new(TokioCleanupScheduler::new(Arc::clone(&delivery)));
    let driver = MessageDriver::new(Arc::clone(&delivery), store, Arc::clone(&scheduler), &config);
    let navigator = Navigator::new(driver, StaticRootWindows::new(main_menu(), group_menu()));

    let conv = ConversationId(1);
    navigator.reset_to_root(conv).await?;
    navigator.dig(conv, [shop()]).await?;
    navigator.flip_page(conv, FlipDirection::Right).await?;
    navigator.flip_page(conv, FlipDirection::Right).await?;
    navigator.dig(conv, [presets::confirm("Buy item 14?", "buy:14")]).await?;
    navigator.handle_action(conv, "back").await?;
    navigator.dig(conv, [profile()]).await?;
    navigator.dig(conv, [profile()]).await?;
    navigator.bury(conv).await?;
    navigator.bury(conv).await?;
    navigator.close(conv).await?;

    tracing::info!(pending = scheduler.pending(), "Demo finished, cancelling cleanup jobs");
    scheduler.shutdown();
    Ok(())
}
