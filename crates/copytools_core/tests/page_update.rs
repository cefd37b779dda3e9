use std::sync::Once;

use copytools_core::{update, ClickTracker, Effect, Msg, PageState};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(copytools_logging::initialize_for_tests);
}

type Key = u32;

fn double_click(text: &str) -> Msg<Key> {
    Msg::DoubleClicked {
        text: text.to_string(),
        element_tag: "INPUT".to_string(),
        timestamp: 7,
    }
}

fn mouse_down(target: Key, disabled: bool, at_ms: i64) -> Msg<Key> {
    Msg::MouseDown {
        target,
        disabled,
        at_ms,
    }
}

#[test]
fn double_click_with_text_emits_copy() {
    init_logging();
    let (_state, effects) = update(PageState::<Key>::default(), double_click("Enter name"));
    assert_eq!(
        effects,
        vec![Effect::CopyText {
            text: "Enter name".to_string(),
            element_tag: "INPUT".to_string(),
            timestamp: 7,
        }]
    );
}

#[test]
fn blank_text_is_ignored() {
    init_logging();
    let (_state, effects) = update(PageState::<Key>::default(), double_click("  \n "));
    assert!(effects.is_empty());
}

#[test]
fn disabled_extension_ignores_double_clicks() {
    init_logging();
    let (state, effects) = update(PageState::<Key>::default(), Msg::Toggled(false));
    assert_eq!(effects, vec![Effect::PersistEnabled(false)]);
    assert!(!state.enabled());

    let (_state, effects) = update(state, double_click("text"));
    assert!(effects.is_empty());
}

#[test]
fn first_run_seeds_enabled_flag() {
    init_logging();
    let (state, effects) = update(
        PageState::<Key>::default(),
        Msg::SettingsLoaded { enabled: None },
    );
    assert!(state.enabled());
    assert_eq!(effects, vec![Effect::PersistEnabled(true)]);

    let (state, effects) = update(state, Msg::SettingsLoaded {
        enabled: Some(false),
    });
    assert!(!state.enabled());
    assert!(effects.is_empty());
}

#[test]
fn two_quick_mouse_downs_on_disabled_element_synthesize_double_click() {
    init_logging();
    let state = PageState::<Key>::new(500);
    let (state, effects) = update(state, mouse_down(3, true, 1_000));
    assert!(effects.is_empty());
    let (state, effects) = update(state, mouse_down(3, true, 1_400));
    assert_eq!(effects, vec![Effect::SynthesizeDoubleClick { target: 3 }]);

    // Tracker resets after firing: a third press starts a new pair.
    let (_state, effects) = update(state, mouse_down(3, true, 1_450));
    assert!(effects.is_empty());
}

#[test]
fn slow_or_split_mouse_downs_do_not_fire() {
    init_logging();
    let state = PageState::<Key>::new(500);
    let (state, _) = update(state, mouse_down(3, true, 0));
    let (state, effects) = update(state, mouse_down(3, true, 501));
    assert!(effects.is_empty());

    let (state, _) = update(state, mouse_down(4, true, 600));
    let (state, effects) = update(state, mouse_down(3, true, 700));
    assert!(effects.is_empty());

    let (state, _) = update(state, mouse_down(5, false, 800));
    let (_state, effects) = update(state, mouse_down(5, false, 900));
    assert!(effects.is_empty());
}

#[test]
fn enabled_element_press_breaks_a_pending_pair() {
    let mut tracker = ClickTracker::<Key>::new(500);
    assert!(!tracker.register(1, 0));
    tracker.reset();
    assert!(!tracker.register(1, 100));
    assert!(tracker.register(1, 200));
}
