//! The page context: watches (double-)clicks on one loaded page, copies the
//! clicked element's text and answers the popup's page-level requests.
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use copytools_core::{update, Effect, Msg, PageState, Request, Response, ScanResult, SenderInfo};
use copytools_logging::{copy_debug, copy_info, copy_warn};
use ego_tree::NodeId;
use serde_json::{Map, Value};

use crate::channel::{ContextHandle, MessageHandler};
use crate::clipboard::ClipboardWriter;
use crate::clock::{system_clock, Clock};
use crate::layout::{InlineStyleLayout, Layout};
use crate::page::{Locator, Page, PageError};
use crate::scan::{is_inert_control, scan_disabled_elements};
use crate::storage::{KeyValueStore, StorageError, SETTINGS_KEY};

/// What a double-click ended up doing. Nothing of this surfaces on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Disabled, blank text, no such element, or no double-click yet.
    Skipped,
    /// The background wrote the clipboard and recorded the copy.
    Delegated,
    /// A local backend wrote the clipboard; the copy was sent for recording.
    CopiedLocally,
    Failed,
}

pub struct PageContext {
    page: Page,
    state: PageState<NodeId>,
    store: Rc<dyn KeyValueStore>,
    background: ContextHandle,
    clipboard: ClipboardWriter,
    clock: Clock,
    layout: Box<dyn Layout>,
}

impl PageContext {
    pub fn new(page: Page, store: Rc<dyn KeyValueStore>, background: ContextHandle) -> Self {
        Self {
            page,
            state: PageState::default(),
            store,
            background,
            clipboard: ClipboardWriter::local(),
            clock: system_clock(),
            layout: Box::new(InlineStyleLayout),
        }
    }

    pub fn with_clipboard(mut self, clipboard: ClipboardWriter) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_layout(mut self, layout: Box<dyn Layout>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_double_click_window(mut self, window_ms: i64) -> Self {
        self.state = PageState::new(window_ms);
        self
    }

    /// Reads `settings.enabled`; seeds it when never stored. A storage error
    /// leaves the context enabled without writing anything.
    pub async fn start(mut self) -> Self {
        let enabled = match self.stored_enabled() {
            Ok(enabled) => enabled,
            Err(err) => {
                copy_warn!("Failed to read settings, assuming enabled: {}", err);
                Some(true)
            }
        };
        self.apply(Msg::SettingsLoaded { enabled }).await;
        copy_info!(
            "Page context ready for {} (enabled: {})",
            self.page.url(),
            self.state.enabled()
        );
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn enabled(&self) -> bool {
        self.state.enabled()
    }

    pub async fn toggle(&mut self, enabled: bool) {
        self.apply(Msg::Toggled(enabled)).await;
    }

    pub async fn double_click(&mut self, target: NodeId) -> CopyOutcome {
        match self.double_click_msg(target) {
            Some(msg) => self.apply(msg).await,
            None => CopyOutcome::Skipped,
        }
    }

    pub async fn double_click_at(&mut self, locator: &Locator) -> Result<CopyOutcome, PageError> {
        let target = self.page.locate(locator)?.id();
        Ok(self.double_click(target).await)
    }

    pub async fn mouse_down(&mut self, target: NodeId) -> CopyOutcome {
        let now = (self.clock)();
        self.mouse_down_at(target, now).await
    }

    /// Two presses on the same disabled control within the window count as a
    /// double-click, since the browser never delivers one for such controls.
    pub async fn mouse_down_at(&mut self, target: NodeId, at_ms: i64) -> CopyOutcome {
        let disabled = self
            .page
            .element(target)
            .map(is_inert_control)
            .unwrap_or(false);
        self.apply(Msg::MouseDown {
            target,
            disabled,
            at_ms,
        })
        .await
    }

    pub fn scan(&self) -> ScanResult {
        scan_disabled_elements(&self.page, self.layout.as_ref(), (self.clock)())
    }

    /// Delegates to the background first; falls back to the local backends and
    /// then asks the background to record the copy.
    pub async fn copy_to_clipboard(
        &mut self,
        text: String,
        element_tag: String,
        timestamp: i64,
    ) -> CopyOutcome {
        let sender = self.page.sender_info();
        let delegated = Request::CopyToClipboard {
            text: text.clone(),
            element_tag: Some(element_tag.clone()),
            timestamp: Some(timestamp),
        };
        match self.background.send(delegated, &sender).await {
            Ok(response) if response.is_success() => return CopyOutcome::Delegated,
            Ok(response) => copy_debug!(
                "Background copy failed: {}",
                response.error_message().unwrap_or("no reason given")
            ),
            Err(err) => copy_debug!("Background unreachable: {}", err),
        }

        if !self.clipboard.write(&text).await {
            copy_debug!("Copy of {} chars failed on every backend", text.chars().count());
            return CopyOutcome::Failed;
        }
        let record = Request::RecordCopy {
            text,
            element_tag,
            timestamp: (self.clock)(),
        };
        if let Err(err) = self.background.send(record, &sender).await {
            copy_debug!("Copy not recorded: {}", err);
        }
        CopyOutcome::CopiedLocally
    }

    fn double_click_msg(&self, target: NodeId) -> Option<Msg<NodeId>> {
        let element = self.page.element(target)?;
        Some(Msg::DoubleClicked {
            text: self.page.extract_text(element),
            element_tag: element.value().name().to_ascii_uppercase(),
            timestamp: (self.clock)(),
        })
    }

    async fn apply(&mut self, msg: Msg<NodeId>) -> CopyOutcome {
        let mut outcome = CopyOutcome::Skipped;
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let (state, effects) = update(self.state.clone(), msg);
            self.state = state;
            for effect in effects {
                match effect {
                    Effect::CopyText {
                        text,
                        element_tag,
                        timestamp,
                    } => outcome = self.copy_to_clipboard(text, element_tag, timestamp).await,
                    Effect::PersistEnabled(enabled) => self.save_enabled_state(enabled),
                    Effect::SynthesizeDoubleClick { target } => {
                        queue.extend(self.double_click_msg(target));
                    }
                }
            }
        }
        outcome
    }

    fn stored_enabled(&self) -> Result<Option<bool>, StorageError> {
        Ok(self
            .store
            .get(SETTINGS_KEY)?
            .and_then(|settings| settings.get("enabled").and_then(Value::as_bool)))
    }

    /// Read-modify-write of the stored settings object; other fields are kept.
    fn save_enabled_state(&self, enabled: bool) {
        let mut settings = match self.store.get(SETTINGS_KEY) {
            Ok(Some(Value::Object(map))) => map,
            Ok(_) => Map::new(),
            Err(err) => {
                copy_warn!("Failed to read settings before saving enabled state: {}", err);
                return;
            }
        };
        settings.insert("enabled".to_string(), Value::Bool(enabled));
        if let Err(err) = self.store.set(SETTINGS_KEY, Value::Object(settings)) {
            copy_warn!("Failed to save enabled state: {}", err);
        }
    }
}

#[async_trait(?Send)]
impl MessageHandler for PageContext {
    fn context_name(&self) -> &'static str {
        "page"
    }

    async fn handle(&mut self, request: Request, _sender: &SenderInfo) -> Response {
        copy_debug!("page <- {}", request.action());
        match request {
            Request::Toggle { enabled } => {
                self.toggle(enabled).await;
                Response::ok()
            }
            Request::GetStatus => Response::Status {
                enabled: self.state.enabled(),
            },
            Request::ScanDisabledElements => Response::Scan {
                success: true,
                data: self.scan(),
            },
            _ => Response::unknown_action(),
        }
    }
}
