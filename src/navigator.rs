//! Navigation verbs
//!
//! The navigator is what a router calls after decoding a button press or a
//! command. Every verb follows the same order: load the persisted stack,
//! change it in memory, render the new top through the message driver and
//! only then persist the stack and the conversation mode. A failed render
//! of a non-root window falls back to the root window; a failed root is
//! fatal.

use crate::delivery::DeliveryApi;
use crate::error::{NavError, NavResult};
use crate::ids::{Category, ConversationId};
use crate::lifecycle::MessageDriver;
use crate::scheduler::CleanupScheduler;
use crate::stack::{NavigationStack, PopOutcome, PushOutcome};
use crate::store::KeyValueStore;
use crate::window::{Window, WindowKind, BACK_ACTION, FLIP_LEFT_ACTION, FLIP_RIGHT_ACTION};

/// Supplies the root window of a conversation
pub trait RootWindows: Send + Sync {
    fn root(&self, category: Category) -> Window;
}

/// Fixed root windows, one per conversation category
#[derive(Debug, Clone)]
pub struct StaticRootWindows {
    direct: Window,
    group: Window,
}

impl StaticRootWindows {
    pub fn new(direct: Window, group: Window) -> Self {
        Self { direct, group }
    }

    /// Same root for direct and group conversations
    pub fn shared(root: Window) -> Self {
        Self {
            direct: root.clone(),
            group: root,
        }
    }
}

impl RootWindows for StaticRootWindows {
    fn root(&self, category: Category) -> Window {
        match category {
            Category::Direct => self.direct.clone(),
            Category::Group => self.group.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Left,
    Right,
}

impl FlipDirection {
    fn delta(self) -> i64 {
        match self {
            FlipDirection::Left => -1,
            FlipDirection::Right => 1,
        }
    }
}

/// Whether `handle_action` recognised the token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionHandled {
    Handled,
    /// Not a navigation token; the router should dispatch it
    Unhandled,
}

pub struct Navigator<D, S, C, R> {
    driver: MessageDriver<D, S, C>,
    roots: R,
}

impl<D, S, C, R> Navigator<D, S, C, R>
where
    D: DeliveryApi,
    S: KeyValueStore,
    C: CleanupScheduler,
    R: RootWindows,
{
    pub fn new(driver: MessageDriver<D, S, C>, roots: R) -> Self {
        Self { driver, roots }
    }

    pub fn driver(&self) -> &MessageDriver<D, S, C> {
        &self.driver
    }

    /// Push windows (singleton rule per window) and render the new top
    pub async fn dig(
        &self,
        conv: ConversationId,
        windows: impl IntoIterator<Item = Window>,
    ) -> NavResult<()> {
        let (mut stack, live_kind) = self.load_or_root(conv).await?;
        for window in windows {
            if stack.push(window) == PushOutcome::AlreadyPresent {
                tracing::debug!(conv_id = %conv, "Singleton already on stack, re-rendering top");
            }
        }
        self.show(conv, stack, live_kind).await
    }

    /// Replace the top window and render it
    pub async fn dream(&self, conv: ConversationId, window: Window) -> NavResult<()> {
        let mut stack = self.driver.store().load_stack(conv).await?;
        let live_kind = stack.top().map(|w| w.kind);
        stack
            .replace_top(window)
            .map_err(|_| NavError::EmptyStack)?;
        self.show(conv, stack, live_kind).await
    }

    /// Pop the top window; at the root this is `reset_to_root`
    pub async fn bury(&self, conv: ConversationId) -> NavResult<()> {
        let mut stack = self.driver.store().load_stack(conv).await?;
        let live_kind = stack.top().map(|w| w.kind);
        match stack.pop() {
            PopOutcome::Popped => self.show(conv, stack, live_kind).await,
            PopOutcome::AtRoot => self.reset_to_root(conv).await,
        }
    }

    /// Re-render the current top without changing the stack
    pub async fn look_around(&self, conv: ConversationId) -> NavResult<()> {
        let (stack, live_kind) = self.load_or_root(conv).await?;
        self.show(conv, stack, live_kind).await
    }

    pub async fn flip_page(&self, conv: ConversationId, direction: FlipDirection) -> NavResult<()> {
        let mut window = self.peek_top(conv).await?;
        window.flip(direction.delta());
        self.dream(conv, window).await
    }

    /// Drop all live messages and show the root window alone
    pub async fn reset_to_root(&self, conv: ConversationId) -> NavResult<()> {
        let root = self.roots.root(conv.category());
        let screen = root.screen.clone();
        self.driver.clear(conv).await?;

        let mut stack = NavigationStack::new(root);
        match self.render_top(conv, &mut stack, None).await {
            Ok(()) => Ok(()),
            Err(e @ NavError::Store(_)) => Err(e),
            Err(e) => Err(root_failed(conv, screen, e)),
        }
    }

    /// Copy of the top window, ready to be changed and passed to `dream`
    pub async fn peek_top(&self, conv: ConversationId) -> NavResult<Window> {
        self.driver
            .store()
            .load_stack(conv)
            .await?
            .peek_top()
            .ok_or(NavError::EmptyStack)
    }

    /// Delete every live message, keep the stack. `look_around` restores.
    pub async fn close(&self, conv: ConversationId) -> NavResult<()> {
        self.driver.clear(conv).await?;
        tracing::info!(conv_id = %conv, "Conversation closed");
        Ok(())
    }

    /// Route the reserved navigation tokens
    pub async fn handle_action(&self, conv: ConversationId, token: &str) -> NavResult<ActionHandled> {
        match token {
            BACK_ACTION => self.bury(conv).await?,
            FLIP_LEFT_ACTION => self.flip_page(conv, FlipDirection::Left).await?,
            FLIP_RIGHT_ACTION => self.flip_page(conv, FlipDirection::Right).await?,
            _ => return Ok(ActionHandled::Unhandled),
        }
        Ok(ActionHandled::Handled)
    }

    /// Mode of the window currently live
    pub async fn mode(&self, conv: ConversationId) -> NavResult<Option<String>> {
        Ok(self.driver.store().mode(conv).await?)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Stored stack plus the kind its top was rendered as; a conversation
    /// seen for the first time starts at its root.
    async fn load_or_root(
        &self,
        conv: ConversationId,
    ) -> NavResult<(NavigationStack, Option<WindowKind>)> {
        let stack = self.driver.store().load_stack(conv).await?;
        if stack.is_empty() {
            tracing::debug!(conv_id = %conv, "No stack yet, starting at root");
            return Ok((NavigationStack::new(self.roots.root(conv.category())), None));
        }
        let live_kind = stack.top().map(|w| w.kind);
        Ok((stack, live_kind))
    }

    /// A lone window is the root only if it is the configured root screen;
    /// `dream` can put anything in that slot.
    fn holds_only_root(&self, conv: ConversationId, stack: &NavigationStack) -> bool {
        stack.at_root()
            && stack
                .top()
                .is_some_and(|w| w.screen == self.roots.root(conv.category()).screen)
    }

    async fn show(
        &self,
        conv: ConversationId,
        mut stack: NavigationStack,
        live_kind: Option<WindowKind>,
    ) -> NavResult<()> {
        let screen = stack.top().map(|w| w.screen.clone()).unwrap_or_default();
        let is_root = self.holds_only_root(conv, &stack);
        match self.render_top(conv, &mut stack, live_kind).await {
            Ok(()) => Ok(()),
            Err(e @ NavError::Store(_)) => Err(e),
            Err(e) if is_root => Err(root_failed(conv, screen, e)),
            Err(e) => {
                tracing::warn!(
                    conv_id = %conv,
                    screen = %screen,
                    error = %e,
                    error_kind = e.kind(),
                    "Window failed to render, falling back to root"
                );
                self.reset_to_root(conv).await
            }
        }
    }

    async fn render_top(
        &self,
        conv: ConversationId,
        stack: &mut NavigationStack,
        live_kind: Option<WindowKind>,
    ) -> NavResult<()> {
        let depth = stack.len();
        let top = stack.top_mut().ok_or(NavError::EmptyStack)?;
        let content = top
            .assemble(self.driver.placeholders())
            .map_err(|source| NavError::MalformedWindow {
                screen: top.screen.clone(),
                source,
            })?;
        let mode = top.mode.clone();
        let screen = top.screen.clone();

        let message_id = self.driver.render(conv, &content, live_kind).await?;

        let store = self.driver.store();
        store.save_stack(conv, stack).await?;
        store.set_mode(conv, mode.as_deref()).await?;
        tracing::debug!(
            conv_id = %conv,
            screen = %screen,
            message_id = %message_id,
            depth,
            "Window live"
        );
        Ok(())
    }
}

fn root_failed(conv: ConversationId, screen: String, source: NavError) -> NavError {
    tracing::error!(
        conv_id = %conv,
        screen = %screen,
        error = %source,
        error_kind = source.kind(),
        "Root window failed to render"
    );
    NavError::RootFailed {
        screen,
        source: Box::new(source),
    }
}
