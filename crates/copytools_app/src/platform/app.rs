use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use copytools_engine::{
    ensure_data_dir, is_inert_control, load_page, system_clock, BackgroundService,
    ClipboardWriter, ContextHandle, CopyOutcome, JsonFileStore, KeyValueStore, Locator,
    PageContext, PageSource, ReqwestFetcher,
};
use copytools_logging::{copy_debug, copy_info};

use super::config::AppConfig;
use super::popup::{Notification, PopupController};
use super::ui::render;
use crate::cli::{Command, SettingsArgs};

/// Every context of one invocation, sharing a single storage file.
struct Contexts<'a> {
    config: &'a AppConfig,
    store: Rc<dyn KeyValueStore>,
    background: ContextHandle,
}

impl Contexts<'_> {
    async fn open_page(&self, raw: &str) -> anyhow::Result<PageContext> {
        let source = PageSource::parse(raw);
        let fetcher = ReqwestFetcher::new(self.config.fetch.to_settings());
        let page = load_page(&source, &fetcher)
            .await
            .with_context(|| format!("failed to load {raw}"))?;
        Ok(
            PageContext::new(page, self.store.clone(), self.background.clone())
                .with_double_click_window(self.config.double_click_window_ms)
                .start()
                .await,
        )
    }

    async fn popup(&self, page: Option<&str>) -> anyhow::Result<PopupController> {
        let page = match page {
            Some(raw) => Some(ContextHandle::spawn_local(self.open_page(raw).await?)),
            None => None,
        };
        let mut popup = PopupController::new(self.background.clone(), page, ClipboardWriter::system());
        popup.load().await;
        Ok(popup)
    }
}

/// Runs one command. Must be called inside a `LocalSet`. Returns `false` when the
/// command ended with an error notification.
pub(crate) async fn run(command: Command, config: &AppConfig, data_dir: &Path) -> anyhow::Result<bool> {
    ensure_data_dir(data_dir)
        .with_context(|| format!("data directory {} is unusable", data_dir.display()))?;
    let store: Rc<dyn KeyValueStore> = Rc::new(JsonFileStore::new(data_dir));
    let background = ContextHandle::spawn_local(BackgroundService::load(
        store.clone(),
        ClipboardWriter::system(),
        system_clock(),
    ));
    let contexts = Contexts {
        config,
        store,
        background,
    };
    copy_debug!("Data directory {}", data_dir.display());

    match command {
        Command::History => {
            let popup = contexts.popup(None).await?;
            print!("{}", render::render_history(&popup.view()));
            Ok(true)
        }
        Command::Clear => {
            let mut popup = contexts.popup(None).await?;
            Ok(notify(popup.clear_history().await))
        }
        Command::Settings(args) => settings(&contexts, &args).await,
        Command::Toggle { state, page } => {
            let mut popup = contexts.popup(page.as_deref()).await?;
            Ok(notify(popup.toggle(state.enabled()).await))
        }
        Command::Status { page } => {
            let popup = contexts.popup(Some(&page)).await?;
            match popup.page_status().await {
                Some(enabled) => {
                    println!("{}", if enabled { "enabled" } else { "disabled" });
                    Ok(true)
                }
                None => Ok(notify(Notification::error("Page did not report its status"))),
            }
        }
        Command::Scan { page, copy } => {
            let mut popup = contexts.popup(Some(&page)).await?;
            let scanned = popup.scan().await;
            if let Some(scan) = popup.view().scan {
                print!("{}", render::render_scan(&scan));
            }
            if !notify(scanned) {
                return Ok(false);
            }
            match copy {
                Some(index) => Ok(notify(popup.copy_scan_item(index).await)),
                None => Ok(true),
            }
        }
        Command::Copy {
            page,
            target,
            value,
        } => {
            let locator = target
                .locator()
                .ok_or_else(|| anyhow!("either --selector or --xpath is required"))?;
            let mut context = contexts.open_page(&page).await?;
            let outcome = click(&mut context, &locator, value).await?;
            Ok(notify(match outcome {
                CopyOutcome::Delegated | CopyOutcome::CopiedLocally => {
                    Notification::info("Copied to clipboard")
                }
                CopyOutcome::Skipped => Notification::info("Nothing to copy"),
                CopyOutcome::Failed => Notification::error("Copy failed"),
            }))
        }
        Command::Recopy { index } => {
            let mut popup = contexts.popup(None).await?;
            Ok(notify(popup.recopy(index).await))
        }
    }
}

async fn settings(contexts: &Contexts<'_>, args: &SettingsArgs) -> anyhow::Result<bool> {
    let mut popup = contexts.popup(None).await?;
    if args.is_empty() {
        print!("{}", render::render_settings(popup.settings()));
        return Ok(true);
    }
    let updated = args.apply(popup.settings().clone());
    Ok(notify(popup.save_settings(updated).await))
}

/// Clicks the way a user would: disabled controls never get a native
/// double-click, so they receive two quick presses instead.
async fn click(
    context: &mut PageContext,
    locator: &Locator,
    value: Option<String>,
) -> anyhow::Result<CopyOutcome> {
    let element = context.page().locate(locator)?;
    let target = element.id();
    let inert = is_inert_control(element);
    if let Some(value) = value {
        context.page_mut().set_value(target, value);
    }

    if !inert {
        return Ok(context.double_click(target).await);
    }
    copy_info!("Target is disabled; pressing twice");
    let now = chrono::Utc::now().timestamp_millis();
    let first = context.mouse_down_at(target, now).await;
    if first != CopyOutcome::Skipped {
        return Ok(first);
    }
    Ok(context.mouse_down_at(target, now + 1).await)
}

fn notify(notification: Notification) -> bool {
    let line = render::render_notification(&notification);
    if notification.is_error {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
    !notification.is_error
}
