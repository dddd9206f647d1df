use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde_json::{json, Value};
use stayquote_cli::commands::{config, estimate, price, submit, validate, CommandFailure};
use stayquote_core::config::{ConfigError, LoadOptions};
use stayquote_core::{AppConfig, ApplicationError};
use tempfile::TempDir;

fn stay() -> Value {
    json!({
        "id": "riverside-camp",
        "startDate": "2026-07-01",
        "endDate": "2026-07-15",
        "allowPartialBooking": true,
        "minDays": 3,
        "ageBrackets": [
            { "id": "adult", "label": "Adult", "minAge": 18, "order": 0 },
            { "id": "child", "label": "Child", "minAge": 4, "maxAge": 17, "order": 1 }
        ],
        "subPeriods": [
            { "id": "low", "name": "Low", "startDate": "2026-07-01", "endDate": "2026-07-08" },
            { "id": "high", "name": "High", "startDate": "2026-07-08", "endDate": "2026-07-15" }
        ],
        "rooms": [
            { "id": "single", "name": "Single", "capacity": 1, "tariffs": [
                { "roomTypeId": "single", "ageBracketId": "adult", "price": 80 }
            ] },
            { "id": "double", "name": "Double", "capacity": 2, "tariffs": [
                { "roomTypeId": "double", "ageBracketId": "adult", "price": 100 },
                {
                    "roomTypeId": "double",
                    "ageBracketId": "adult",
                    "subPeriodId": "high",
                    "price": 120
                },
                { "roomTypeId": "double", "ageBracketId": "child", "price": 50 }
            ] }
        ]
    })
}

fn completed_session() -> Value {
    json!({
        "actions": [
            { "type": "set_participants", "ageBracketId": "adult", "count": 2 },
            { "type": "set_participants", "ageBracketId": "child", "count": 1 },
            { "type": "navigate", "event": "advance" },
            { "type": "set_room_quantity", "roomTypeId": "double", "quantity": 1 },
            { "type": "set_room_quantity", "roomTypeId": "single", "quantity": 1 },
            { "type": "navigate", "event": "advance" },
            { "type": "auto_assign" }
        ]
    })
}

fn request() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.org",
        "phone": "555-0199",
        "checkIn": "2026-07-02",
        "checkOut": "2026-07-06"
    })
}

struct Inputs {
    _dir: TempDir,
    stay: PathBuf,
    session: PathBuf,
    request: PathBuf,
}

fn inputs(stay: &Value, session: &Value, request: &Value) -> Inputs {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let write = |name: &str, value: &Value| {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).expect("input file should be written");
        path
    };
    let stay = write("stay.json", stay);
    let session = write("session.json", session);
    let request = write("request.json", request);
    Inputs { _dir: dir, stay, session, request }
}

fn amount(value: &Value) -> Option<f64> {
    value.as_str().and_then(|raw| raw.parse().ok())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[test]
fn validate_accepts_a_well_formed_stay() {
    let files = inputs(&stay(), &json!({}), &request());

    let result = validate::run(&files.stay);
    assert_eq!(result.exit_code, 0, "expected a valid snapshot");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "validate");
    assert_eq!(payload["status"], "ok");
    assert!(payload["message"].as_str().unwrap_or_default().contains("riverside-camp"));
}

#[test]
fn validate_reports_structural_violations() {
    let mut broken = stay();
    broken["subPeriods"][1]["startDate"] = json!("2026-07-05");
    let files = inputs(&broken, &json!({}), &request());

    let result = validate::run(&files.stay);
    assert_eq!(result.exit_code, 3, "expected snapshot validation failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "snapshot_validation");
    let codes: Vec<&str> = payload["data"]
        .as_array()
        .expect("violations should be listed")
        .iter()
        .filter_map(|violation| violation["code"].as_str())
        .collect();
    assert!(codes.contains(&"OVERLAPPING_SUB_PERIODS"));
}

#[test]
fn validate_reports_unreadable_input() {
    let result = validate::run(Path::new("/nonexistent/stay.json"));
    assert_eq!(result.exit_code, 2, "expected input failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "input");
    assert!(payload["message"].as_str().unwrap_or_default().contains("stay snapshot"));
}

#[test]
fn price_replays_the_session_and_prints_the_summary() {
    let files = inputs(&stay(), &completed_session(), &request());

    let result = price::run(&AppConfig::default(), &files.stay, &files.session);
    assert_eq!(result.exit_code, 0, "expected a priced session: {}", result.output);

    let payload = parse_payload(&result.output);
    let summary = &payload["data"]["summary"];
    assert_eq!(payload["command"], "price");
    assert_eq!(summary["step"], "assignment");
    assert_eq!(summary["totalAssigned"], 3);
    assert_eq!(amount(&summary["price"]["total"]), Some(230.0));
    assert_eq!(summary["price"]["hasUndefinedPricing"], false);
}

#[test]
fn price_surfaces_guard_failures_with_unmet_conditions() {
    let session = json!({
        "actions": [
            { "type": "set_participants", "ageBracketId": "adult", "count": 3 },
            { "type": "navigate", "event": "advance" },
            { "type": "set_room_quantity", "roomTypeId": "double", "quantity": 1 },
            { "type": "navigate", "event": "advance" }
        ]
    });
    let files = inputs(&stay(), &session, &request());

    let result = price::run(&AppConfig::default(), &files.stay, &files.session);
    assert_eq!(result.exit_code, 4, "expected a domain failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "flow_guard");
    assert_eq!(payload["data"][0]["code"], "INSUFFICIENT_CAPACITY");
}

#[test]
fn price_reconciles_a_saved_configuration_before_replaying() {
    let first = inputs(&stay(), &completed_session(), &request());
    let priced = parse_payload(
        &price::run(&AppConfig::default(), &first.stay, &first.session).output,
    );

    let mut shrunk = stay();
    shrunk["rooms"] = json!([shrunk["rooms"][1].clone()]);
    let saved = json!({ "configuration": priced["data"]["configuration"].clone() });
    let second = inputs(&shrunk, &saved, &request());

    let result = price::run(&AppConfig::default(), &second.stay, &second.session);
    assert_eq!(result.exit_code, 0, "expected reconciled session: {}", result.output);

    let summary = &parse_payload(&result.output)["data"]["summary"];
    assert_eq!(summary["totalCapacity"], 2);
    assert_eq!(summary["totalAssigned"], 2);
    assert_eq!(amount(&summary["price"]["total"]), Some(150.0));
}

#[test]
fn estimate_averages_global_prices_without_assignments() {
    let session = json!({
        "actions": [
            { "type": "set_participants", "ageBracketId": "adult", "count": 2 }
        ]
    });
    let files = inputs(&stay(), &session, &request());

    let result = estimate::run(&AppConfig::default(), &files.stay, &files.session);
    assert_eq!(result.exit_code, 0, "expected an estimate: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(amount(&payload["data"]["estimate"]["total"]), Some(180.0));
    assert!(payload["message"].as_str().unwrap_or_default().contains("approximation"));
}

#[test]
fn submit_builds_the_payload_of_a_completed_session() {
    let files = inputs(&stay(), &completed_session(), &request());

    let result = submit::run(&AppConfig::default(), &files.stay, &files.session, &files.request);
    assert_eq!(result.exit_code, 0, "expected a submission: {}", result.output);

    let payload = parse_payload(&result.output);
    let submission = &payload["data"]["submission"];
    assert_eq!(submission["stayId"], "riverside-camp");
    assert_eq!(submission["email"], "ada@example.org");
    assert_eq!(payload["data"]["nights"], 4);
    assert_eq!(submission["rooms"].as_array().map(Vec::len), Some(2));
}

#[test]
fn submit_rejects_a_stay_shorter_than_the_minimum() {
    let mut short = request();
    short["checkOut"] = json!("2026-07-03");
    let files = inputs(&stay(), &completed_session(), &short);

    let result = submit::run(&AppConfig::default(), &files.stay, &files.session, &files.request);
    assert_eq!(result.exit_code, 4, "expected a submission validation failure");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "submission_validation");
}

#[test]
fn config_reports_env_and_file_sources() {
    with_env(&[("STAYQUOTE_LOG_LEVEL", "debug")], || {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("stayquote.toml");
        fs::write(&path, "[engine]\ncapacity_safety_factor = \"1.5\"\n")
            .expect("config file should be written");

        let options = LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        };
        let loaded = AppConfig::load(options).expect("config should load");

        let result = config::run(&loaded, Some(path.as_path()));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("logging.level = debug (source: env (STAYQUOTE_LOG_LEVEL))"));
        assert!(message.contains("engine.capacity_safety_factor = 1.5 (source: file ("));
        assert!(message.contains("logging.format = Compact (source: default)"));
    });
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STAYQUOTE_ENGINE_CAPACITY_SAFETY_FACTOR",
        "STAYQUOTE_LOGGING_LEVEL",
        "STAYQUOTE_LOGGING_FORMAT",
        "STAYQUOTE_LOG_LEVEL",
        "STAYQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}

#[test]
fn configuration_failures_render_as_config_validation() {
    let error = ConfigError::Validation("logging.level must not be empty".to_owned());
    let result = CommandFailure::from_application(ApplicationError::from(error))
        .into_result("startup");
    assert_eq!(result.exit_code, 2, "expected config failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "startup");
    assert_eq!(payload["error_class"], "config_validation");
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .starts_with("configuration issue: configuration validation failed"));
}
