//! Popup presenter: mirrors background state, relays user actions as requests
//! and reports each action as a [`Notification`].
use copytools_core::{
    popup_view, CopyRecord, PopupViewModel, Request, Response, ScanResult, SenderInfo, Settings,
};
use copytools_engine::{ClipboardWriter, ContextHandle};
use copytools_logging::{copy_debug, copy_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

pub(crate) struct PopupController {
    background: ContextHandle,
    page: Option<ContextHandle>,
    clipboard: ClipboardWriter,
    sender: SenderInfo,
    settings: Settings,
    history: Vec<CopyRecord>,
    scan: Option<ScanResult>,
}

impl PopupController {
    pub fn new(
        background: ContextHandle,
        page: Option<ContextHandle>,
        clipboard: ClipboardWriter,
    ) -> Self {
        Self {
            background,
            page,
            clipboard,
            sender: SenderInfo::default(),
            settings: Settings::default(),
            history: Vec::new(),
            scan: None,
        }
    }

    /// Pulls settings (defaults on failure) and history from the background.
    pub async fn load(&mut self) {
        self.settings = match self.background.send(Request::GetSettings, &self.sender).await {
            Ok(Response::Settings { settings }) => settings,
            Ok(other) => {
                copy_debug!("Unexpected settings reply: {:?}", other);
                Settings::default()
            }
            Err(err) => {
                copy_debug!("Settings unavailable: {}", err);
                Settings::default()
            }
        };
        self.refresh_history().await;
    }

    pub fn view(&self) -> PopupViewModel {
        popup_view(&self.settings, &self.history, self.scan.as_ref())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn toggle(&mut self, enabled: bool) -> Notification {
        let settings = Settings {
            enabled,
            ..self.settings.clone()
        };
        if let Err(message) = self.send_settings(settings).await {
            copy_warn!("Toggle failed: {}", message);
            return Notification::error("Failed to switch copy tools");
        }
        if let Some(page) = &self.page {
            // Pages without a running context are skipped.
            if let Err(err) = page.send(Request::Toggle { enabled }, &self.sender).await {
                copy_debug!("Page not toggled: {}", err);
            }
        }
        Notification::info(if enabled {
            "Copy tools enabled"
        } else {
            "Copy tools disabled"
        })
    }

    pub async fn clear_history(&mut self) -> Notification {
        match self.background.send(Request::ClearHistory, &self.sender).await {
            Ok(response) if response.is_success() => {
                self.history.clear();
                Notification::info("History cleared")
            }
            Ok(response) => {
                copy_debug!("Clear refused: {:?}", response);
                Notification::error("Failed to clear history")
            }
            Err(err) => {
                copy_debug!("Clear failed: {}", err);
                Notification::error("Failed to clear history")
            }
        }
    }

    pub async fn save_settings(&mut self, settings: Settings) -> Notification {
        match self.send_settings(settings).await {
            Ok(()) => {
                self.refresh_history().await;
                Notification::info("Settings saved")
            }
            Err(message) => {
                copy_warn!("Saving settings failed: {}", message);
                Notification::error(format!("Failed to save settings: {message}"))
            }
        }
    }

    /// Copies a history entry again through the popup's own clipboard writer.
    pub async fn recopy(&mut self, index: usize) -> Notification {
        let Some(text) = self.history.get(index).map(|record| record.text.clone()) else {
            return Notification::error(format!("No history entry #{index}"));
        };
        self.copy_text(&text, "Copied to clipboard again").await
    }

    pub async fn scan(&mut self) -> Notification {
        let Some(page) = &self.page else {
            return Notification::error("No page to scan");
        };
        match page.send(Request::ScanDisabledElements, &self.sender).await {
            Ok(Response::Scan {
                success: true,
                data,
            }) => {
                let total = data.total;
                self.scan = Some(data);
                if total == 0 {
                    Notification::info("Scan complete, no disabled elements found")
                } else {
                    Notification::info(format!("Scan complete! Found {total} disabled elements"))
                }
            }
            Ok(other) => {
                copy_debug!("Unexpected scan reply: {:?}", other);
                Notification::error("Scan failed, make sure the page is loaded")
            }
            Err(err) => {
                copy_debug!("Scan failed: {}", err);
                Notification::error("Scan failed, make sure the page is loaded")
            }
        }
    }

    /// Copies the text of one row of the last scan.
    pub async fn copy_scan_item(&mut self, index: usize) -> Notification {
        let text = self
            .scan
            .as_ref()
            .and_then(|scan| scan.elements.get(index))
            .map(|element| element.text.clone());
        match text {
            Some(text) => self.copy_text(&text, "Copied to clipboard").await,
            None => Notification::error(format!("No scan result #{index}")),
        }
    }

    /// `enabled` as reported by the page context, if one answers.
    pub async fn page_status(&self) -> Option<bool> {
        let page = self.page.as_ref()?;
        match page.send(Request::GetStatus, &self.sender).await {
            Ok(Response::Status { enabled }) => Some(enabled),
            Ok(other) => {
                copy_debug!("Unexpected status reply: {:?}", other);
                None
            }
            Err(err) => {
                copy_debug!("Status unavailable: {}", err);
                None
            }
        }
    }

    async fn copy_text(&mut self, text: &str, success: &str) -> Notification {
        if self.clipboard.write(text).await {
            Notification::info(success)
        } else {
            Notification::error("Copy failed")
        }
    }

    async fn send_settings(&mut self, settings: Settings) -> Result<(), String> {
        let request = Request::SaveSettings {
            settings: settings.clone(),
        };
        let response = self
            .background
            .send(request, &self.sender)
            .await
            .map_err(|err| err.to_string())?;
        if !response.is_success() {
            return Err(response
                .error_message()
                .unwrap_or("settings were not saved")
                .to_string());
        }
        self.settings = settings;
        Ok(())
    }

    async fn refresh_history(&mut self) {
        self.history = match self.background.send(Request::GetCopyHistory, &self.sender).await {
            Ok(Response::History { history }) => history,
            Ok(other) => {
                copy_debug!("Unexpected history reply: {:?}", other);
                Vec::new()
            }
            Err(err) => {
                copy_debug!("History unavailable: {}", err);
                Vec::new()
            }
        };
    }
}
