use copytools_core::{Request, Response, RouteError, Settings};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn copy_request_accepts_optional_fields() {
    let full = Request::from_value(json!({
        "action": "copyToClipboard",
        "text": "hello",
        "elementTag": "INPUT",
        "timestamp": 42
    }))
    .unwrap();
    assert_eq!(
        full,
        Request::CopyToClipboard {
            text: "hello".to_string(),
            element_tag: Some("INPUT".to_string()),
            timestamp: Some(42),
        }
    );

    let bare = Request::from_value(json!({ "action": "copyToClipboard", "text": "x" })).unwrap();
    assert_eq!(
        bare,
        Request::CopyToClipboard {
            text: "x".to_string(),
            element_tag: None,
            timestamp: None,
        }
    );
}

#[test]
fn unit_actions_round_trip_through_json() {
    for request in [
        Request::GetCopyHistory,
        Request::ClearHistory,
        Request::GetSettings,
        Request::GetStatus,
        Request::ScanDisabledElements,
    ] {
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "action": request.action() }));
        assert_eq!(Request::from_value(value).unwrap(), request);
    }
}

#[test]
fn unknown_action_is_reported_explicitly() {
    let err = Request::from_value(json!({ "action": "selfDestruct" })).unwrap_err();
    assert_eq!(err, RouteError::UnknownAction("selfDestruct".to_string()));

    let response = Response::from(err);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({ "error": "Unknown action" })
    );
    assert_eq!(Response::unknown_action(), response);
}

#[test]
fn missing_action_is_unknown() {
    let err = Request::from_value(json!({ "text": "hi" })).unwrap_err();
    assert!(matches!(err, RouteError::UnknownAction(_)));
}

#[test]
fn known_action_with_bad_payload_is_invalid() {
    let err = Request::from_value(json!({ "action": "toggle", "enabled": "yes" })).unwrap_err();
    match err {
        RouteError::InvalidPayload { action, .. } => assert_eq!(action, "toggle"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn save_settings_merges_omitted_fields_over_defaults() {
    let request = Request::from_value(json!({
        "action": "saveSettings",
        "settings": { "maxHistorySize": 5 }
    }))
    .unwrap();
    assert_eq!(
        request,
        Request::SaveSettings {
            settings: Settings {
                max_history_size: 5,
                ..Settings::default()
            }
        }
    );
}

#[test]
fn responses_serialize_to_flat_shapes() {
    assert_eq!(
        serde_json::to_value(Response::ok()).unwrap(),
        json!({ "success": true })
    );
    assert_eq!(
        serde_json::to_value(Response::failure("nope")).unwrap(),
        json!({ "success": false, "error": "nope" })
    );
    assert_eq!(
        serde_json::to_value(Response::Status { enabled: false }).unwrap(),
        json!({ "enabled": false })
    );
    assert_eq!(
        serde_json::to_value(Response::Settings {
            settings: Settings::default()
        })
        .unwrap(),
        json!({ "settings": {
            "enabled": true,
            "showTooltip": true,
            "soundEnabled": false,
            "maxHistorySize": 50
        }})
    );
}

#[test]
fn responses_decode_to_the_matching_variant() {
    let decoded: Response = serde_json::from_value(json!({ "success": true })).unwrap();
    assert!(decoded.is_success());

    let decoded: Response = serde_json::from_value(json!({ "error": "Unknown action" })).unwrap();
    assert_eq!(decoded.error_message(), Some("Unknown action"));
    assert!(!decoded.is_success());

    let decoded: Response = serde_json::from_value(json!({ "history": [] })).unwrap();
    assert_eq!(decoded, Response::History { history: vec![] });
}
