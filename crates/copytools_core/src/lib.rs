//! Copy tools core: data model, request envelopes and the pure page-context state machine.
mod effect;
mod history;
mod msg;
mod record;
mod request;
mod scan;
mod settings;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use history::HistoryList;
pub use msg::Msg;
pub use record::{CopyRecord, SenderInfo};
pub use request::{Request, Response, RouteError, ACTIONS};
pub use scan::{DisabledBy, ElementInfo, Position, ScanResult};
pub use settings::{Settings, SettingsError, DEFAULT_MAX_HISTORY};
pub use state::{ClickTracker, PageState, DEFAULT_DOUBLE_CLICK_WINDOW_MS};
pub use update::update;
pub use view_model::{
    popup_view, HistoryRowView, PopupViewModel, ScanRowView, ScanView, UNKNOWN_TAG,
};
