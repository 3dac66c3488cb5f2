//! Process-level tests for the pipeline executor.
//!
//! These run real programs (`cat`, `wc`, `sh`, ...) and check stream wiring,
//! redirections and status aggregation through files in a temp directory.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};

use pipeflow::pipeline::{
    ExecutionOptions, OutputDisposition, Pipeline, PipelineExecutor, Stage, Termination,
    DEFAULT_FILE_MODE, FAILURE_SENTINEL, SUCCESS,
};
use pipeflow::{create_default_builtins, Dispatcher, PipeflowError, StatusMode, WaitStrategy};

fn executor(wait: WaitStrategy, status: StatusMode) -> PipelineExecutor {
    PipelineExecutor::new(ExecutionOptions {
        wait,
        status,
        file_mode: DEFAULT_FILE_MODE,
    })
}

fn concurrent() -> PipelineExecutor {
    executor(WaitStrategy::Concurrent, StatusMode::Collapse)
}

fn stage(argv: &[&str]) -> Stage {
    Stage::new(argv.iter().copied())
}

fn piped(argv: &[&str]) -> Stage {
    stage(argv).with_output(OutputDisposition::Pipe)
}

fn to_file(argv: &[&str], path: &Path) -> Stage {
    stage(argv).with_output(OutputDisposition::Truncate(path.to_path_buf()))
}

fn pipeline(stages: Vec<Stage>) -> Pipeline {
    Pipeline::new(stages).expect("valid pipeline")
}

// ============================================================================
// Status aggregation
// ============================================================================

#[tokio::test]
async fn single_stage_status_follows_exit_code() {
    let executor = concurrent();

    let report = executor.execute(&pipeline(vec![stage(&["true"])])).await.unwrap();
    assert_eq!(report.status(), SUCCESS);

    let report = executor.execute(&pipeline(vec![stage(&["false"])])).await.unwrap();
    assert_eq!(report.status(), FAILURE_SENTINEL);

    let report = executor
        .execute(&pipeline(vec![stage(&["sh", "-c", "exit 7"])]))
        .await
        .unwrap();
    assert_eq!(report.status(), FAILURE_SENTINEL);
    assert_eq!(report.outcomes[0].termination, Termination::Exited(7));
}

#[tokio::test]
async fn exact_mode_keeps_final_exit_code() {
    let executor = executor(WaitStrategy::Concurrent, StatusMode::Exact);

    let report = executor
        .execute(&pipeline(vec![piped(&["true"]), stage(&["sh", "-c", "exit 7"])]))
        .await
        .unwrap();
    assert_eq!(report.status(), 7);
}

#[tokio::test]
async fn only_last_stage_status_survives() {
    for wait in [WaitStrategy::Concurrent, WaitStrategy::Sequential] {
        let executor = executor(wait, StatusMode::Collapse);

        let report = executor
            .execute(&pipeline(vec![piped(&["false"]), stage(&["true"])]))
            .await
            .unwrap();
        assert_eq!(report.status(), SUCCESS, "false | true with {:?}", wait);
        assert_eq!(report.outcomes[0].termination, Termination::Exited(1));

        let report = executor
            .execute(&pipeline(vec![piped(&["true"]), stage(&["false"])]))
            .await
            .unwrap();
        assert_eq!(report.status(), FAILURE_SENTINEL, "true | false with {:?}", wait);
    }
}

#[tokio::test]
async fn signal_death_is_failure() {
    let killed = || pipeline(vec![stage(&["sh", "-c", "kill -9 $$"])]);

    let report = concurrent().execute(&killed()).await.unwrap();
    assert_eq!(report.outcomes[0].termination, Termination::Signaled(9));
    assert_eq!(report.status(), FAILURE_SENTINEL);

    let exact = executor(WaitStrategy::Concurrent, StatusMode::Exact);
    assert_eq!(exact.execute(&killed()).await.unwrap().status(), 137);
}

// ============================================================================
// Stream wiring
// ============================================================================

#[tokio::test]
async fn binary_data_flows_verbatim_through_pipes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let output = dir.path().join("output.bin");

    // Every byte value, larger than a pipe buffer, no trailing newline
    let data: Vec<u8> = (0..=255u8).cycle().take(300 * 256 + 17).collect();
    std::fs::write(&input, &data).unwrap();

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["cat"]).with_input(&input),
            piped(&["cat"]),
            to_file(&["cat"], &output),
        ]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read(&output).unwrap(), data);
}

#[tokio::test]
async fn sequential_wait_wires_small_pipelines() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let executor = executor(WaitStrategy::Sequential, StatusMode::Collapse);

    let report = executor
        .execute(&pipeline(vec![
            piped(&["printf", "b\\na\\nc"]),
            piped(&["sort"]),
            to_file(&["cat"], &output),
        ]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "a\nb\nc\n");
}

#[tokio::test]
async fn concurrent_wait_handles_output_larger_than_pipe_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("count.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["head", "-c", "1048576", "/dev/zero"]),
            to_file(&["wc", "-c"], &output),
        ]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "1048576");
}

#[tokio::test]
async fn early_exit_of_reader_stops_writer() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("first.txt");

    // `yes` only stops once no read end is left open anywhere
    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["yes"]),
            to_file(&["head", "-n", "1"], &output),
        ]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "y\n");
}

#[tokio::test]
async fn ls_into_wc_counts_entries() {
    let dir = tempfile::tempdir().unwrap();
    let listed = dir.path().join("listed");
    std::fs::create_dir(&listed).unwrap();
    for name in ["a", "b", "c"] {
        std::fs::write(listed.join(name), name).unwrap();
    }
    let output = dir.path().join("count.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["ls", listed.to_str().unwrap()]),
            to_file(&["wc", "-l"], &output),
        ]))
        .await
        .unwrap();

    assert_eq!(report.status(), SUCCESS);
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "3");
}

// ============================================================================
// Redirections
// ============================================================================

#[tokio::test]
async fn input_redirect_feeds_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    std::fs::write(&input, "line one\nline two").unwrap();

    let report = concurrent()
        .execute(&pipeline(vec![to_file(&["cat"], &output).with_input(&input)]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read(&output).unwrap(), std::fs::read(&input).unwrap());
}

#[tokio::test]
async fn truncate_replaces_and_append_preserves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let executor = concurrent();

    // created when absent
    executor
        .execute(&pipeline(vec![to_file(&["printf", "first\\n"], &path)]))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");

    executor
        .execute(&pipeline(vec![stage(&["printf", "second\\n"])
            .with_output(OutputDisposition::Append(path.clone()))]))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");

    executor
        .execute(&pipeline(vec![to_file(&["printf", "x"], &path)]))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
}

#[tokio::test]
async fn append_creates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            stage(&["printf", "entry"]).with_output(OutputDisposition::Append(path.clone()))
        ]))
        .await
        .unwrap();

    assert!(report.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "entry");
}

// ============================================================================
// Stage-local failures
// ============================================================================

#[tokio::test]
async fn missing_input_file_fails_only_its_stage() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("count.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["cat"]).with_input(dir.path().join("absent.txt")),
            to_file(&["wc", "-c"], &output),
        ]))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].termination, Termination::NotStarted);
    assert_eq!(report.outcomes[1].termination, Termination::Exited(0));
    // Nothing from the failed stage reached the pipe
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "0");
    assert_eq!(report.status(), SUCCESS);
}

#[tokio::test]
async fn missing_input_file_on_single_stage_fails_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let exact = executor(WaitStrategy::Concurrent, StatusMode::Exact);

    let report = exact
        .execute(&pipeline(vec![stage(&["cat"]).with_input(dir.path().join("absent"))]))
        .await
        .unwrap();

    assert_eq!(report.status(), 1);
}

#[tokio::test]
async fn unwritable_output_fails_stage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("out.txt");

    let report = concurrent()
        .execute(&pipeline(vec![to_file(&["printf", "x"], &path)]))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].termination, Termination::NotStarted);
    assert_eq!(report.status(), FAILURE_SENTINEL);
    assert!(!path.exists());
}

#[tokio::test]
async fn missing_program_does_not_stop_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&["printf", "hello"]),
            piped(&["pipeflow-test-no-such-program"]),
            to_file(&["cat"], &output),
        ]))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[1].termination, Termination::NotStarted);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    assert_eq!(report.status(), SUCCESS);
}

#[tokio::test]
async fn invalid_executable_image_fails_only_its_stage() {
    let dir = tempfile::tempdir().unwrap();
    let program = dir.path().join("broken");
    std::fs::write(&program, b"\x7fELF\0\0\0\0").unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();
    let output = dir.path().join("count.txt");

    let report = concurrent()
        .execute(&pipeline(vec![
            piped(&[program.to_str().unwrap()]),
            to_file(&["wc", "-c"], &output),
        ]))
        .await
        .unwrap();

    assert_eq!(report.outcomes[0].termination, Termination::NotStarted);
    assert_eq!(report.outcomes[1].termination, Termination::Exited(0));
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "0");
    assert_eq!(report.status(), SUCCESS);
}

// ============================================================================
// Orchestration failures
// ============================================================================

/// A NUL byte inside an argument passes program lookup but cannot be handed
/// to the OS, so the second stage fails to spawn while `sleep` is running.
fn unspawnable_middle_stage() -> Pipeline {
    pipeline(vec![
        piped(&["sleep", "5"]),
        piped(&["cat", "a\0b"]),
        stage(&["true"]),
    ])
}

#[tokio::test]
async fn spawn_failure_aborts_and_kills_running_stages() {
    let started = Instant::now();

    let result = concurrent().execute(&unspawnable_middle_stage()).await;

    assert!(
        matches!(result, Err(PipeflowError::Spawn { stage: 1, .. })),
        "expected spawn failure at stage 1, got {:?}",
        result
    );
    // `sleep 5` was killed rather than waited out
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn dispatcher_maps_spawn_failure_to_sentinel() {
    let builtins = create_default_builtins();
    let executor = concurrent();
    let dispatcher = Dispatcher::new(&builtins, &executor);
    let started = Instant::now();

    let outcome = dispatcher.dispatch(&unspawnable_middle_stage(), 0).await;

    assert_eq!(outcome.status, FAILURE_SENTINEL);
    assert!(!outcome.exit_requested);
    assert!(started.elapsed() < Duration::from_secs(2));
}
