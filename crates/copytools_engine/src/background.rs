//! The background context: owns the copy history and settings, performs
//! privileged clipboard writes on behalf of pages.
use std::rc::Rc;

use async_trait::async_trait;
use copytools_core::{
    CopyRecord, HistoryList, Request, Response, SenderInfo, Settings, SettingsError,
};
use copytools_logging::{copy_debug, copy_info, copy_warn};
use serde_json::Value;

use crate::channel::MessageHandler;
use crate::clipboard::ClipboardWriter;
use crate::clock::Clock;
use crate::storage::{KeyValueStore, HISTORY_KEY, LAST_UPDATED_KEY, SETTINGS_KEY};

pub const CLIPBOARD_FAILED: &str = "Clipboard write failed";

pub struct BackgroundService {
    store: Rc<dyn KeyValueStore>,
    clipboard: ClipboardWriter,
    history: HistoryList,
    settings: Settings,
    clock: Clock,
}

impl BackgroundService {
    /// Restores history and settings from `store`. Unreadable entries are logged
    /// and replaced by defaults.
    pub fn load(store: Rc<dyn KeyValueStore>, clipboard: ClipboardWriter, clock: Clock) -> Self {
        let settings = match store.get(SETTINGS_KEY) {
            Ok(stored) => Settings::from_stored(stored.as_ref()),
            Err(err) => {
                copy_warn!("Failed to read settings, using defaults: {}", err);
                Settings::default()
            }
        };
        let records = match store.get(HISTORY_KEY) {
            Ok(Some(value)) => serde_json::from_value::<Vec<CopyRecord>>(value).unwrap_or_else(|err| {
                copy_warn!("Ignoring unreadable copy history: {}", err);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                copy_warn!("Failed to read copy history: {}", err);
                Vec::new()
            }
        };
        let history = HistoryList::from_records(records, settings.max_history_size);
        copy_info!(
            "Background ready: {} records, max {}",
            history.len(),
            history.max_size()
        );
        Self {
            store,
            clipboard,
            history,
            settings,
            clock,
        }
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn record_copy(
        &mut self,
        text: &str,
        element_tag: &str,
        timestamp: i64,
        sender: &SenderInfo,
    ) -> CopyRecord {
        let now = (self.clock)();
        let record = self
            .history
            .record(text, element_tag, timestamp, sender, now)
            .clone();
        self.persist_history();
        record
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    pub fn set_max_history_size(&mut self, max_size: usize) -> Result<(), SettingsError> {
        if max_size == 0 {
            return Err(SettingsError::MaxHistoryNotPositive);
        }
        self.settings.max_history_size = max_size;
        if self.history.set_max_size(max_size) {
            self.persist_history();
        }
        Ok(())
    }

    /// Writes `text` through the clipboard chain and records it on success.
    pub async fn copy_to_clipboard(
        &mut self,
        text: &str,
        element_tag: Option<&str>,
        timestamp: Option<i64>,
        sender: &SenderInfo,
    ) -> Response {
        if !self.clipboard.write(text).await {
            copy_debug!("No clipboard backend accepted the text");
            return Response::failure(CLIPBOARD_FAILED);
        }
        let timestamp = timestamp.unwrap_or_else(|| (self.clock)());
        self.record_copy(text, element_tag.unwrap_or_default(), timestamp, sender);
        Response::ok()
    }

    /// Stored settings merged over defaults. The in-memory copy stands in when the
    /// store cannot be read.
    pub fn get_settings(&mut self) -> Settings {
        match self.store.get(SETTINGS_KEY) {
            Ok(stored) => {
                self.settings = Settings::from_stored(stored.as_ref());
                self.settings.clone()
            }
            Err(err) => {
                copy_warn!("Failed to read settings: {}", err);
                self.settings.clone()
            }
        }
    }

    pub fn save_settings(&mut self, settings: Settings) -> Response {
        if let Err(err) = settings.validate() {
            return Response::failure(err.to_string());
        }
        let value = match serde_json::to_value(&settings) {
            Ok(value) => value,
            Err(err) => return Response::failure(err.to_string()),
        };
        if let Err(err) = self.store.set(SETTINGS_KEY, value) {
            copy_warn!("Failed to save settings: {}", err);
            return Response::failure(err.to_string());
        }
        let max_size = settings.max_history_size;
        self.settings = settings;
        if let Err(err) = self.set_max_history_size(max_size) {
            return Response::failure(err.to_string());
        }
        Response::ok()
    }

    fn persist_history(&self) {
        let history = match serde_json::to_value(self.history.list()) {
            Ok(history) => history,
            Err(err) => {
                copy_warn!("Failed to encode copy history: {}", err);
                return;
            }
        };
        let entries = [
            (HISTORY_KEY, history),
            (LAST_UPDATED_KEY, Value::from((self.clock)())),
        ];
        if let Err(err) = self.store.set_many(&entries) {
            copy_warn!("Failed to persist copy history: {}", err);
        }
    }
}

#[async_trait(?Send)]
impl MessageHandler for BackgroundService {
    fn context_name(&self) -> &'static str {
        "background"
    }

    async fn handle(&mut self, request: Request, sender: &SenderInfo) -> Response {
        copy_debug!("background <- {} from {:?}", request.action(), sender.url);
        match request {
            Request::CopyToClipboard {
                text,
                element_tag,
                timestamp,
            } => {
                self.copy_to_clipboard(&text, element_tag.as_deref(), timestamp, sender)
                    .await
            }
            Request::RecordCopy {
                text,
                element_tag,
                timestamp,
            } => {
                self.record_copy(&text, &element_tag, timestamp, sender);
                Response::ok()
            }
            Request::GetCopyHistory => Response::History {
                history: self.history.list().to_vec(),
            },
            Request::ClearHistory => {
                self.clear_history();
                Response::ok()
            }
            Request::GetSettings => Response::Settings {
                settings: self.get_settings(),
            },
            Request::SaveSettings { settings } => self.save_settings(settings),
            Request::Toggle { .. } | Request::GetStatus | Request::ScanDisabledElements => {
                Response::unknown_action()
            }
        }
    }
}
