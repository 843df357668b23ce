use predicates::str::contains;
use shiftlog_testing::{assertions, fixtures, TestWorld};

fn write_active_session(world: &TestWorld, agent: &str, session_id: &str, transcript_path: &std::path::Path) {
    let body = serde_json::json!({
        "agent": agent,
        "session_id": session_id,
        "transcript_path": transcript_path,
        "started_at": "2026-07-28T09:59:00Z",
    });
    world
        .write_absolute(world.repo_root().join(".git/shiftlog/active-session.json"), body.to_string())
        .unwrap();
}

#[test]
fn init_writes_repo_local_config() {
    let world = TestWorld::new();
    world.run(&["init", "--agent", "claude"]).success().stdout(contains("agent=claude"));

    let config_path = world.repo_root().join(".shiftlog/config.json");
    assert!(config_path.is_file(), "expected {} to exist", config_path.display());
}

#[test]
fn store_hookless_then_list_and_show_round_trip() {
    let world = TestWorld::new();
    world.run(&["init", "--agent", "claude"]).success();

    let transcript_path = world.repo_root().join("transcript.jsonl");
    let sample = fixtures::claude(&transcript_path, "session-a");
    world.write_absolute(&transcript_path, &sample.transcript_bytes).unwrap();
    write_active_session(&world, "claude", &sample.session_id, &transcript_path);

    let commit = world.commit("implement retry helper").unwrap();
    world.run(&["store", "--hookless"]).success();

    assertions::assert_session_id(&world, "refs/notes/shiftlog", &commit, "session-a").unwrap();
    assertions::assert_transcript_intact(&world, "refs/notes/shiftlog", &commit).unwrap();

    world.run(&["list"]).success().stdout(contains("session-a"));
    world.run(&["show", &commit]).success().stdout(contains("retry"));
}

#[test]
fn store_is_idempotent_on_unchanged_head() {
    let world = TestWorld::new();
    world.run(&["init"]).success();

    let transcript_path = world.repo_root().join("transcript.jsonl");
    let sample = fixtures::claude(&transcript_path, "session-b");
    world.write_absolute(&transcript_path, &sample.transcript_bytes).unwrap();
    write_active_session(&world, "claude", &sample.session_id, &transcript_path);

    let commit = world.commit("first pass").unwrap();
    world.run(&["store", "--hookless"]).success();
    world.run(&["store", "--hookless"]).success();

    let annotations = world.read_note("refs/notes/shiftlog", &commit).unwrap();
    assert_eq!(annotations.matches("session-b").count(), 1, "capture must not duplicate on a repeat call");
}

#[test]
fn doctor_reports_missing_config_before_init() {
    let world = TestWorld::new();
    world.run(&["doctor"]).failure().stdout(contains("config.present"));
}

#[test]
fn search_finds_text_in_captured_transcript() {
    let world = TestWorld::new();
    world.run(&["init"]).success();

    let transcript_path = world.repo_root().join("transcript.jsonl");
    let sample = fixtures::claude(&transcript_path, "session-c");
    world.write_absolute(&transcript_path, &sample.transcript_bytes).unwrap();
    write_active_session(&world, "claude", &sample.session_id, &transcript_path);
    world.commit("add retry logic").unwrap();
    world.run(&["store", "--hookless"]).success();

    world.run(&["search", "retry"]).success().stdout(contains("session-c"));
    world.run(&["search", "no-such-term-anywhere"]).success().stdout(contains("no matches"));
}
