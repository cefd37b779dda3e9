pub const DEFAULT_DOUBLE_CLICK_WINDOW_MS: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState<K> {
    enabled: bool,
    clicks: ClickTracker<K>,
}

impl<K: Copy + Eq> Default for PageState<K> {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_CLICK_WINDOW_MS)
    }
}

impl<K: Copy + Eq> PageState<K> {
    pub fn new(double_click_window_ms: i64) -> Self {
        Self {
            enabled: true,
            clicks: ClickTracker::new(double_click_window_ms),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn clicks_mut(&mut self) -> &mut ClickTracker<K> {
        &mut self.clicks
    }
}

/// Pairs two mouse-downs on the same element into a synthetic double-click.
///
/// The window is fixed per tracker and does not follow the host's double-click
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickTracker<K> {
    window_ms: i64,
    last: Option<(K, i64)>,
}

impl<K: Copy + Eq> ClickTracker<K> {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms: window_ms.max(0),
            last: None,
        }
    }

    /// Returns `true` when this press completes a pair; the tracker then resets.
    pub fn register(&mut self, target: K, at_ms: i64) -> bool {
        if let Some((previous, previous_at)) = self.last {
            let elapsed = at_ms - previous_at;
            if previous == target && (0..=self.window_ms).contains(&elapsed) {
                self.last = None;
                return true;
            }
        }
        self.last = Some((target, at_ms));
        false
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
