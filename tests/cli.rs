use pretty_assertions::assert_eq;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

const SCENARIO: &str = "\
01/01/20 00:00:00.000000 INFO ConnectionManager: Blocks in message M1 are shuffle_0_0_2,shuffle_0_1_2
01/01/20 00:00:01.000000 INFO ConnectionManager: Finished sending [Message id = M1, size = 100] to [host:7077]
01/01/20 00:00:02.000000 INFO ConnectionManager: Handling buffer [Message id = M1, size = 100] from [host:7077]
01/01/20 00:00:03.000000 INFO ConnectionManager: Response to [Message aid = M1, id = A1]
01/01/20 00:00:04.000000 INFO ConnectionManager: Finished sending [Message aid = M1, id = A1]
01/01/20 00:00:05.000000 INFO ConnectionManager: Handling ack message [Message aid = M1, id = A1]
01/01/20 00:00:06.000000 INFO BlockFetcherIterator: Got remote block shuffle_0_0_2 size 10 after  250ms
";

fn log_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

/// Run the binary; returns (stdout, stderr, exit code).
fn run(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_shuffle-timing"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute shuffle-timing");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn path(file: &NamedTempFile) -> &str {
    file.path().to_str().expect("temp path is UTF-8")
}

#[test]
fn single_reducer_with_block_detail() {
    let log = log_file(SCENARIO);
    let (stdout, stderr, code) = run(&[path(&log), "-n", "2", "-r", "2"]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(
        stdout,
        "shuffle_0_0_2,2020-01-01 00:00:00,1.0,1.0,1.0,1.0,1.0,0.25\n\
         shuffle 2 start 2020-01-01 00:00:00 end 2020-01-01 00:00:05 delta 5.0\n"
    );
}

#[test]
fn all_reducers_without_block_detail() {
    let log = log_file(SCENARIO);
    let (stdout, stderr, code) = run(&[path(&log), "-n", "3"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("shuffle 0 start "), "{}", lines[0]);
    assert!(lines[1].starts_with("shuffle 1 start "), "{}", lines[1]);
    // -n 3 also enumerates shuffle_0_2_2, which was never begun.
    assert_eq!(
        lines[2],
        "shuffle 2 start 2020-01-01 00:00:00 end 2020-01-01 00:00:05 delta 5.0"
    );

    // Reducers without blocks keep the sentinel span.
    let delta: f64 = lines[0]
        .rsplit(' ')
        .next()
        .and_then(|d| d.parse().ok())
        .expect("delta field");
    assert!(delta < -1e12, "{delta}");
}

#[test]
fn files_are_merged_in_order() {
    let (head, tail) = SCENARIO.split_at(SCENARIO.find("01/01/20 00:00:03").unwrap());
    let first = log_file(head);
    let second = log_file(tail);

    let (stdout, stderr, code) = run(&[path(&first), path(&second), "-n", "2", "-r", "2"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.ends_with("delta 5.0\n"), "{stdout}");
}

#[test]
fn header_and_json_output() {
    let log = log_file(SCENARIO);

    let (stdout, _, code) = run(&[path(&log), "-n", "2", "-r", "2", "--header"]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.lines().next(),
        Some("block_id,begin,send_req,network,build_reply,send_reply,parse,wall_time")
    );

    let (stdout, _, code) = run(&[path(&log), "-n", "2", "-r", "2", "--format", "json"]);
    assert_eq!(code, 0);
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid JSON line"))
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["block_id"], "shuffle_0_0_2");
    assert_eq!(records[1]["type"], "reducer");
    assert_eq!(records[1]["end"], "2020-01-01 00:00:05");
}

#[test]
fn missing_reply_fails_unless_skipped() {
    let without_reply: String = SCENARIO
        .lines()
        .filter(|line| !line.contains("Handling ack message"))
        .map(|line| format!("{line}\n"))
        .collect();
    let log = log_file(&without_reply);

    let (stdout, stderr, code) = run(&[path(&log), "-n", "2", "-r", "2"]);
    assert_ne!(code, 0);
    assert_eq!(stdout, "");
    assert!(stderr.contains("no reply time recorded for M1"), "{stderr}");

    let (stdout, stderr, code) = run(&[path(&log), "-n", "2", "-r", "2", "--skip-incomplete"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.starts_with("shuffle 2 start "), "{stdout}");
    assert!(stderr.contains("skipping shuffle_0_0_2"), "{stderr}");
}

#[test]
fn malformed_timestamp_aborts() {
    let log = log_file(&format!(
        "{SCENARIO}2020-01-01T00:00:07Z INFO ConnectionManager: Blocks in message M2 are shuffle_0_1_1\n"
    ));
    let (stdout, stderr, code) = run(&[path(&log), "-n", "2"]);
    assert_ne!(code, 0);
    assert_eq!(stdout, "");
    assert!(stderr.contains(":8"), "{stderr}");
}

#[test]
fn unreadable_file_aborts() {
    let log = log_file(SCENARIO);
    let (stdout, stderr, code) = run(&[path(&log), "/nonexistent/shuffle.log", "-n", "2"]);
    assert_ne!(code, 0);
    assert_eq!(stdout, "");
    assert!(stderr.contains("/nonexistent/shuffle.log"), "{stderr}");
}

#[test]
fn num_reducers_is_required() {
    let log = log_file(SCENARIO);
    let (_, stderr, code) = run(&[path(&log)]);
    assert_ne!(code, 0);
    assert!(stderr.contains("-n"), "{stderr}");
}

#[test]
fn negative_one_reducer_means_all() {
    let log = log_file(SCENARIO);
    let (all, _, code) = run(&[path(&log), "-n", "3"]);
    assert_eq!(code, 0);
    let (explicit, stderr, code) = run(&[path(&log), "-n", "3", "-r", "-1"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(explicit, all);
}

#[test]
fn non_utf8_noise_is_ignored() {
    let mut log = NamedTempFile::new().expect("Failed to create temp file");
    log.write_all(b"01/01/20 00:00:00.000000 WARN Executor: caf\xe9 \xff noise\n")
        .expect("Failed to write to temp file");
    log.write_all(SCENARIO.as_bytes())
        .expect("Failed to write to temp file");

    let (stdout, stderr, code) = run(&[path(&log), "-n", "2", "-r", "2"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.ends_with("delta 5.0\n"), "{stdout}");
}
