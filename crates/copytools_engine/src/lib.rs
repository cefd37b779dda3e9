//! Copy tools engine: page loading, extraction, clipboard, storage and the
//! background/page contexts.
mod background;
mod channel;
mod clipboard;
mod clock;
mod decode;
mod extract;
mod fetch;
mod layout;
mod page;
mod page_context;
mod persist;
mod scan;
mod storage;
mod xpath;

pub use background::{BackgroundService, CLIPBOARD_FAILED};
pub use channel::{dispatch_json, ContextHandle, MessageHandler, TransportError};
pub use clipboard::{
    ArboardBackend, ClipboardBackend, ClipboardError, ClipboardWriter, CommandBackend,
    Osc52Backend,
};
pub use clock::{fixed_clock, system_clock, Clock};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{current_value, extract_text, has_disabled_attribute, rendered_text, LiveValues};
pub use fetch::{FetchError, FetchSettings, Fetcher, RemotePage, ReqwestFetcher};
pub use layout::{is_visible, ComputedStyle, InlineStyleLayout, Layout, Rect};
pub use page::{load_page, LoadError, Locator, Page, PageError, PageSource};
pub use page_context::{CopyOutcome, PageContext};
pub use persist::{ensure_data_dir, read_if_exists, AtomicFileWriter, PersistError};
pub use scan::{disabled_reason, is_inert_control, scan_disabled_elements};
pub use storage::{
    JsonFileStore, KeyValueStore, MemoryStore, StorageError, HISTORY_KEY, LAST_UPDATED_KEY,
    SETTINGS_KEY, STORAGE_FILENAME,
};
pub use xpath::{element_xpath, resolve_xpath};
