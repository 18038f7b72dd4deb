//! Window Stack - window navigation and message lifecycle for chat bots
//!
//! Each conversation keeps a persisted stack of screens and exactly one live
//! platform message showing the top of that stack. Navigation verbs change
//! the stack; the message driver edits or recreates the live message.

pub mod config;
pub mod delivery;
pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod navigator;
pub mod scheduler;
pub mod stack;
pub mod store;
pub mod widget;
pub mod window;

#[cfg(test)]
mod testing;

pub use config::NavConfig;
pub use delivery::{DeliveryApi, DeliveryError, LoggingDelivery};
pub use error::{NavError, NavResult};
pub use ids::{Category, ConversationId, MessageId};
pub use lifecycle::MessageDriver;
pub use navigator::{ActionHandled, FlipDirection, Navigator, RootWindows, StaticRootWindows};
pub use scheduler::{CleanupScheduler, TokioCleanupScheduler};
pub use stack::NavigationStack;
pub use store::{ConversationStore, KeyValueStore, SqliteStore};
pub use widget::{ButtonWidget, DataTextWidget, TextWidget};
pub use window::{Window, WindowKind};
