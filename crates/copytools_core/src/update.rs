use crate::{Effect, Msg, PageState};

/// Pure update function for the page context: applies a message to state and
/// returns the effects the caller must run.
pub fn update<K: Copy + Eq>(
    mut state: PageState<K>,
    msg: Msg<K>,
) -> (PageState<K>, Vec<Effect<K>>) {
    let effects = match msg {
        Msg::SettingsLoaded {
            enabled: Some(enabled),
        } => {
            state.set_enabled(enabled);
            Vec::new()
        }
        Msg::SettingsLoaded { enabled: None } => {
            // First run: nothing stored yet, so seed the default.
            state.set_enabled(true);
            vec![Effect::PersistEnabled(true)]
        }
        Msg::Toggled(enabled) => {
            state.set_enabled(enabled);
            state.clicks_mut().reset();
            vec![Effect::PersistEnabled(enabled)]
        }
        Msg::DoubleClicked {
            text,
            element_tag,
            timestamp,
        } => {
            if !state.enabled() || text.trim().is_empty() {
                return (state, Vec::new());
            }
            vec![Effect::CopyText {
                text,
                element_tag,
                timestamp,
            }]
        }
        Msg::MouseDown {
            target,
            disabled,
            at_ms,
        } => {
            if !state.enabled() || !disabled {
                state.clicks_mut().reset();
                return (state, Vec::new());
            }
            if state.clicks_mut().register(target, at_ms) {
                vec![Effect::SynthesizeDoubleClick { target }]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
