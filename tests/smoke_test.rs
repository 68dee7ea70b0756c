/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        // keep a developer's config and .env out of the picture
        .env("XDG_CONFIG_HOME", env!("CARGO_TARGET_TMPDIR"))
        .env_remove("MOODATLAS_API_URL")
        .env_remove("MOODATLAS_USE_MOCK")
        .output()
        .expect("Failed to execute cargo run")
}

/// Drop ANSI color and attribute sequences
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn binary_shows_help() {
    let output = run(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("moodatlas"), "Help output should mention moodatlas");
    assert!(stdout.contains("snapshot"));
}

#[test]
fn binary_shows_version() {
    let output = run(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = run(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn mock_stats_prints_distribution() {
    let output = run(&["--mock", "stats"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("30"), "stats should count all sample countries");
    assert!(stdout.contains("Happy"));
}

#[test]
fn mock_spikes_prints_feed() {
    let output = run(&["--mock", "spikes"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 Mood Spikes Detected"));
    assert!(stdout.contains("UA"));
}

#[test]
fn mock_expression_is_match_json() {
    let output = run(&["--mock", "expression"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"match\""));
    assert!(stdout.contains("iso_3166_1"));
    assert!(stdout.contains("#38bdf8"));
}

#[test]
fn mock_unknown_country_fails_without_panic() {
    let output = run(&["--mock", "country", "ZZ"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ZZ"));
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn mock_snapshot_renders_frame() {
    let output = run(&["--mock", "snapshot", "--width", "100", "--height", "30"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("MoodAtlas"));
    assert!(stdout.contains("Spike"));
}
