pub const STATUS_ENABLED: &str = "enabled";
pub const STATUS_DISABLED: &str = "disabled";

pub const EMPTY_HISTORY: &str = "No copies yet. Double-click any element to copy its text.";
pub const EMPTY_SCAN: &str = "No disabled elements found";

pub const BADGE_VISIBLE: &str = "[visible]";
pub const BADGE_HIDDEN: &str = "[hidden]";

pub const UNKNOWN_TIME: &str = "--:--";

/// Longest single-line preview of copied text, in characters.
pub const PREVIEW_CHARS: usize = 80;
