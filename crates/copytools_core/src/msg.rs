/// Inputs to the page-context state machine. `K` identifies an element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<K> {
    /// Stored `settings.enabled` read at startup; `None` when never persisted.
    SettingsLoaded { enabled: Option<bool> },
    /// Popup flipped the on/off switch.
    Toggled(bool),
    /// A double-click landed on an element whose text has already been extracted.
    DoubleClicked {
        text: String,
        element_tag: String,
        timestamp: i64,
    },
    /// Raw mouse-down; disabled controls never receive a native double-click.
    MouseDown { target: K, disabled: bool, at_ms: i64 },
    NoOp,
}
