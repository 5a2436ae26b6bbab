use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use audio_fingerprint::testing::signals;
use serde_json::Value;
use tempfile::TempDir;

const RATE: u32 = 16_000;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fingerprint_cli"))
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Scratch directory holding four clips: a tone, an identical copy of
    /// it, loud noise and silence
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let tone = signals::sine(RATE, 220.0, 0.7, RATE as usize);
        signals::write_wav_i16(&dir.path().join("tone.wav"), RATE, &tone).expect("tone.wav");
        signals::write_wav_i16(&dir.path().join("tone_copy.wav"), RATE, &tone)
            .expect("tone_copy.wav");
        signals::write_wav_i16(
            &dir.path().join("noise.wav"),
            RATE,
            &signals::white_noise(RATE as usize, 0.8, 9),
        )
        .expect("noise.wav");
        signals::write_wav_i16(
            &dir.path().join("quiet.wav"),
            RATE,
            &signals::silence(RATE as usize),
        )
        .expect("quiet.wav");
        Self { dir }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn catalog(&self) -> PathBuf {
        self.file("catalog.json")
    }

    fn run(&self, args: &[&str]) -> Output {
        cli()
            .arg("--catalog")
            .arg(self.catalog())
            .args(args)
            .output()
            .expect("failed to run fingerprint_cli")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut full = args.to_vec();
        full.push("--json");
        let output = self.run(&full);
        assert!(
            output.status.success(),
            "{:?} exited with {:?}: {}",
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
        serde_json::from_str(stdout.trim()).expect("JSON payload")
    }

    fn ingest_all(&self) -> Value {
        let files: Vec<String> = ["tone.wav", "noise.wav", "tone_copy.wav", "quiet.wav"]
            .iter()
            .map(|name| path_arg(&self.file(name)))
            .collect();
        let mut args = vec!["ingest"];
        args.extend(files.iter().map(String::as_str));
        self.run_json(&args)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn ids(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .expect("array payload")
        .iter()
        .map(|entry| entry["id"].as_u64().expect("numeric id"))
        .collect()
}

#[test]
fn analyze_reports_categories_without_touching_catalog() {
    let ws = Workspace::new();
    let json = ws.run_json(&[
        "analyze",
        &path_arg(&ws.file("tone.wav")),
        &path_arg(&ws.file("noise.wav")),
        &path_arg(&ws.file("quiet.wav")),
    ]);

    let reports = json.as_array().expect("array");
    assert_eq!(reports.len(), 3);
    assert_eq!(
        reports[0]["report"]["classification"]["category"],
        "music/instrument"
    );
    assert_eq!(
        reports[1]["report"]["classification"]["category"],
        "dynamic/noise"
    );
    assert_eq!(
        reports[2]["report"]["classification"]["category"],
        "silence/static"
    );
    assert!(!ws.catalog().exists());
}

#[test]
fn analyze_missing_file_exits_with_partial_failure() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "analyze",
        &path_arg(&ws.file("tone.wav")),
        &path_arg(&ws.file("absent.wav")),
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("music/instrument"), "got {stdout}");
    assert!(stdout.contains("error:"), "got {stdout}");
}

#[test]
fn ingest_then_list_sorted_by_title() {
    let ws = Workspace::new();
    let stored = ws.ingest_all();
    assert_eq!(ids(&stored), vec![1, 2, 3, 4]);

    let listed = ws.run_json(&["list"]);
    let titles: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .map(|entry| entry["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["noise", "quiet", "tone", "tone_copy"]);

    let silent_only = ws.run_json(&["list", "--category", "silence/static"]);
    assert_eq!(ids(&silent_only), vec![4]);

    let by_name = ws.run_json(&["list", "--name", "TONE"]);
    assert_eq!(ids(&by_name), vec![1, 3]);
}

#[test]
fn reingesting_a_file_keeps_its_id() {
    let ws = Workspace::new();
    ws.ingest_all();

    let again = ws.run_json(&["ingest", &path_arg(&ws.file("noise.wav")), "--artist", "Hiss"]);
    assert_eq!(ids(&again), vec![2]);

    let stats = ws.run_json(&["stats"]);
    assert_eq!(stats["total_songs"], 4);
}

#[test]
fn duplicates_finds_identical_clips() {
    let ws = Workspace::new();
    ws.ingest_all();

    let pairs = ws.run_json(&["duplicates"]);
    let pairs = pairs.as_array().expect("array");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["first"]["id"], 1);
    assert_eq!(pairs[0]["second"]["id"], 3);
    assert_eq!(pairs[0]["distance"].as_f64(), Some(0.0));
}

#[test]
fn recommend_excludes_the_seed_song() {
    let ws = Workspace::new();
    ws.ingest_all();

    let matches = ws.run_json(&["recommend", "1", "--top-k", "3"]);
    let ranked = ids(&matches);
    assert_eq!(ranked.len(), 3);
    assert!(!ranked.contains(&1));
    assert_eq!(ranked[0], 3);
    assert_eq!(matches[0]["rank"], 1);
    assert_eq!(matches[0]["kind"], "distance");
}

#[test]
fn recommend_unknown_song_fails() {
    let ws = Workspace::new();
    ws.ingest_all();

    let output = ws.run(&["recommend", "99"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("No catalog record with id 99"),
        "got {stderr}"
    );
}

#[test]
fn search_by_file_and_by_id() {
    let ws = Workspace::new();
    ws.ingest_all();

    let by_file = ws.run_json(&[
        "search",
        "--file",
        &path_arg(&ws.file("tone.wav")),
        "--top-k",
        "2",
    ]);
    // Both tone copies score 0; catalog order breaks the tie
    assert_eq!(ids(&by_file), vec![1, 3]);

    let cosine = ws.run_json(&["search", "--id", "2", "--metric", "cosine", "--top-k", "1"]);
    assert_eq!(ids(&cosine), vec![2]);
    assert_eq!(cosine[0]["kind"], "similarity");
    assert!((cosine[0]["score"].as_f64().expect("score") - 1.0).abs() < 1e-9);
}

#[test]
fn search_rejects_unknown_metric() {
    let ws = Workspace::new();
    ws.ingest_all();

    let output = ws.run(&["search", "--id", "1", "--metric", "chebyshev"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("chebyshev"), "got {stderr}");
}

#[test]
fn update_show_delete_and_stats() {
    let ws = Workspace::new();
    ws.ingest_all();

    let output = ws.run(&["update", "2", "--title", "Static Burst", "--artist", "Lab"]);
    assert!(output.status.success());

    let record = ws.run_json(&["show", "2"]);
    assert_eq!(record["metadata"]["title"], "Static Burst");
    assert_eq!(record["metadata"]["artist"], "Lab");
    assert_eq!(record["category"], "dynamic/noise");

    let output = ws.run(&["delete", "4"]);
    assert!(output.status.success());
    assert_eq!(ws.run(&["delete", "4"]).status.code(), Some(2));

    let stats = ws.run_json(&["stats"]);
    assert_eq!(stats["total_songs"], 3);
    assert_eq!(stats["by_category"]["music/instrument"], 2);
    assert_eq!(stats["by_category"]["dynamic/noise"], 1);
    assert!((stats["total_duration"].as_f64().expect("duration") - 3.0).abs() < 1e-9);
}

#[test]
fn malformed_config_falls_back_to_defaults() {
    let ws = Workspace::new();
    let config = ws.file("config.json");
    std::fs::write(&config, "{ not json").expect("write config");

    let json = ws.run_json(&[
        "--config",
        &path_arg(&config),
        "analyze",
        &path_arg(&ws.file("tone.wav")),
    ]);
    assert_eq!(json[0]["report"]["fingerprint"]["num_frames"], 79);
}

#[test]
fn invalid_config_values_are_rejected() {
    let ws = Workspace::new();
    let config = ws.file("config.json");
    std::fs::write(&config, r#"{ "analysis": { "overlap_ratio": 1.5 } }"#).expect("write config");

    let output = ws.run(&[
        "--config",
        &path_arg(&config),
        "analyze",
        &path_arg(&ws.file("tone.wav")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("overlap_ratio"), "got {stderr}");
}

#[test]
fn unknown_metric_in_config_is_rejected() {
    let ws = Workspace::new();
    let config = ws.file("config.json");
    std::fs::write(&config, r#"{ "search": { "metric": "chebyshev" } }"#).expect("write config");

    let output = ws.run(&[
        "--config",
        &path_arg(&config),
        "analyze",
        &path_arg(&ws.file("tone.wav")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("search.metric"), "got {stderr}");
    assert!(stderr.contains("chebyshev"), "got {stderr}");
}
