//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with HOME pointed at a fresh temp dir, so
//! config and database live in `<tmp>/.config/horologe/`.

use std::process::Command;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_horologe-cli"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("HOROLOGE_ENV")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &TempDir, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_on_fresh_home() {
    let home = TempDir::new().unwrap();
    let status = run_json(&home, &["status"]);
    assert_eq!(status["stopwatch"]["elapsed_ms"], 0);
    assert_eq!(status["pomodoro"]["phase"], "work");
    assert_eq!(status["pomodoro"]["remaining_ms"], 25 * 60_000);
    assert!(home.path().join(".config/horologe/horologe.db").exists());
    assert!(home.path().join(".config/horologe/config.toml").exists());
}

#[test]
fn test_stopwatch_start_and_pause() {
    let home = TempDir::new().unwrap();
    let started = run_json(&home, &["stopwatch", "start"]);
    assert_eq!(started["type"], "StopwatchStarted");

    // Second start is a no-op and prints the state instead.
    let again = run_json(&home, &["stopwatch", "start"]);
    assert_eq!(again["running"], true);

    let paused = run_json(&home, &["stopwatch", "pause"]);
    assert_eq!(paused["type"], "StopwatchPaused");
}

#[test]
fn test_countdown_set_and_presets() {
    let home = TempDir::new().unwrap();
    let armed = run_json(
        &home,
        &["countdown", "set", "--minutes", "90", "--seconds", "x"],
    );
    assert_eq!(armed["type"], "CountdownArmed");
    assert_eq!(armed["target_ms"], 59 * 60_000);

    let saved = run_json(&home, &["countdown", "save", "Pasta", "--minutes", "9"]);
    assert_eq!(saved["type"], "PresetSaved");
    let id = saved["preset"]["id"].as_str().unwrap().to_string();

    let presets = run_json(&home, &["countdown", "presets"]);
    assert_eq!(presets[0]["name"], "Pasta");
    assert_eq!(presets[0]["durationMs"], 540_000);

    let loaded = run_json(&home, &["countdown", "load", &id]);
    assert_eq!(loaded[0]["type"], "PresetLoaded");

    let (_, stderr, code) = run_cli(&home, &["countdown", "save", "   "]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_settled_countdown_keeps_stdout_single_json() {
    let home = TempDir::new().unwrap();
    run_json(&home, &["countdown", "set", "--seconds", "1"]);
    let started = run_json(&home, &["countdown", "start"]);
    assert_eq!(started["type"], "CountdownStarted");

    std::thread::sleep(std::time::Duration::from_millis(1200));
    let (stdout, stderr, code) = run_cli(&home, &["status"]);
    assert_eq!(code, 0, "status failed: {stderr}");
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["countdown"]["complete"], true);
    assert!(stderr.contains(r#""type":"CountdownCompleted""#));
}

#[test]
fn test_pomodoro_settings_and_switch() {
    let home = TempDir::new().unwrap();
    let changed = run_json(&home, &["pomodoro", "settings", "--work", "50"]);
    assert_eq!(changed["type"], "PomodoroConfigChanged");
    assert_eq!(changed["config"]["workMin"], 50);

    let switched = run_json(&home, &["pomodoro", "switch", "long"]);
    assert_eq!(switched["type"], "PhaseSwitched");
    assert_eq!(switched["to"], "longBreak");

    let (_, _, code) = run_cli(&home, &["pomodoro", "settings", "--short", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_alarm_lifecycle() {
    let home = TempDir::new().unwrap();
    let added = run_json(
        &home,
        &["alarm", "add", "06:45", "--days", "mon,fri", "--label", "Wake"],
    );
    assert_eq!(added["type"], "AlarmAdded");
    let id = added["alarm"]["id"].as_str().unwrap().to_string();

    let toggled = run_json(&home, &["alarm", "toggle", &id]);
    assert_eq!(toggled["enabled"], false);

    let list = run_json(&home, &["alarm", "list"]);
    assert_eq!(list[0]["timeOfDay"], "06:45");
    assert_eq!(list[0]["recurrenceDays"][1], "fri");

    let removed = run_json(&home, &["alarm", "remove", &id]);
    assert_eq!(removed["type"], "AlarmRemoved");

    let (_, _, code) = run_cli(&home, &["alarm", "add", "25:00"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_set() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "get", "ticks.stopwatch_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(&home, &["config", "set", "clock.utc_offset_minutes", "-300"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(&home, &["config", "get", "clock.utc_offset_minutes"]);
    assert_eq!(stdout.trim(), "-300");

    let (_, stderr, code) = run_cli(&home, &["config", "get", "nope.nothing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nope.nothing"));

    let (_, _, code) = run_cli(&home, &["config", "set", "clock.utc_offset_minutes", "1500"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_keys_all_resolve() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "keys"]);
    assert_eq!(code, 0);
    let keys: Vec<&str> = stdout.lines().collect();
    assert!(keys.contains(&"clock.utc_offset_minutes"));
    for key in keys {
        let (_, stderr, code) = run_cli(&home, &["config", "get", key]);
        assert_eq!(code, 0, "{key}: {stderr}");
    }
}

#[test]
fn test_watch_exits_after_duration() {
    let home = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(&home, &["watch", "--duration-ms", "300"]);
    assert_eq!(code, 0, "watch failed: {stderr}");
    assert!(stdout.contains("stopwatch 00:00.00"));
}
