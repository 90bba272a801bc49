//! Baseline lifecycle tests
//!
//! Drives the comparator through first run, update mode, passing and failing
//! comparisons against real files in a temporary test directory.

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::TempDir;
use test_case::test_case;

use playwright_visual::codec::encode_png;
use playwright_visual::config::{FAILURE_DIRECTORY_KEY, THRESHOLD_KEY};
use playwright_visual::{
    CapturedInput, CompareOptions, Outcome, RunConfig, Screenshot, ScreenshotOptions,
    Error, SnapshotComparator, SnapshotFailure, TestIdentity, VisualSnapshot,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba(rgba),
    )))
    .unwrap()
}

fn identity(tmp: &TempDir, test_name: &str) -> TestIdentity {
    TestIdentity::new(tmp.path().join("test_pages.py"), test_name)
}

fn baseline(tmp: &TempDir, group: &str, name: &str) -> PathBuf {
    tmp.path()
        .join("snapshots")
        .join("test_pages")
        .join(group)
        .join(name)
}

fn failures(root: &Path, full_name: &str) -> PathBuf {
    root.join("snapshot_tests_failures")
        .join("test_pages")
        .join(full_name)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn first_run_creates_baseline_then_passes() {
    let tmp = TempDir::new().unwrap();
    let config = RunConfig::default();
    let comparator = SnapshotComparator::new(&config);
    let id = identity(&tmp, "test_empty");
    let bytes = png(20, 10, [10, 200, 30, 255]);
    let options = CompareOptions::named("empty_state.png");

    let outcome = comparator
        .compare(&id, CapturedInput::bytes(bytes.clone()), &options)
        .unwrap();

    let path = baseline(&tmp, "test_empty", "empty_state.png");
    assert_eq!(outcome, Outcome::NewBaseline { baseline: path.clone() });
    assert_eq!(fs::read(&path).unwrap(), bytes);

    let second = comparator
        .compare(&id, CapturedInput::bytes(bytes), &options)
        .unwrap();
    assert_eq!(second, Outcome::Pass);
    assert!(!failures(tmp.path(), "test_empty").exists());
}

#[test]
fn default_name_comes_from_test_name() {
    let tmp = TempDir::new().unwrap();
    let config = RunConfig::default();
    let id = identity(&tmp, "test_home[webkit]");

    let outcome = SnapshotComparator::new(&config)
        .compare(&id, png(2, 2, WHITE).into(), &CompareOptions::default())
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::NewBaseline {
            baseline: baseline(&tmp, "test_home", "test_home[webkit].png")
        }
    );
}

#[test]
fn mismatch_writes_three_artifacts() {
    let tmp = TempDir::new().unwrap();
    let white = png(100, 100, WHITE);
    let path = baseline(&tmp, "test_login", "login.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &white).unwrap();

    let config = RunConfig::default();
    let id = identity(&tmp, "test_login");
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &id,
            png(100, 100, BLACK).into(),
            &CompareOptions::named("login.png"),
        )
        .unwrap();

    let dir = failures(tmp.path(), "test_login");
    assert_eq!(
        outcome,
        Outcome::Mismatch {
            artifact_dir: dir.clone(),
            mismatched_pixels: 10_000
        }
    );
    assert_eq!(
        file_names(&dir),
        vec!["Actual_login.png", "Diff_login.png", "Expected_login.png"]
    );
    assert_eq!(fs::read(dir.join("Expected_login.png")).unwrap(), white);
    assert_eq!(fs::read(&path).unwrap(), white);

    let diff = image::open(dir.join("Diff_login.png")).unwrap().to_rgba8();
    assert_eq!(diff.dimensions(), (100, 100));
    assert_eq!(diff.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
}

#[test]
fn stale_artifacts_are_removed_before_rerun() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_card", "card.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(8, 8, WHITE)).unwrap();

    let dir = failures(tmp.path(), "test_card");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Diff_old.png"), b"stale").unwrap();
    fs::write(dir.join("notes.txt"), b"stale").unwrap();

    let config = RunConfig::default();
    let id = identity(&tmp, "test_card");
    let comparator = SnapshotComparator::new(&config);

    let outcome = comparator
        .compare(&id, png(8, 8, BLACK).into(), &CompareOptions::named("card.png"))
        .unwrap();
    assert!(matches!(outcome, Outcome::Mismatch { .. }));
    assert_eq!(
        file_names(&dir),
        vec!["Actual_card.png", "Diff_card.png", "Expected_card.png"]
    );

    // A passing run leaves no artifact directory behind.
    let outcome = comparator
        .compare(&id, png(8, 8, WHITE).into(), &CompareOptions::named("card.png"))
        .unwrap();
    assert_eq!(outcome, Outcome::Pass);
    assert!(!dir.exists());
}

#[test]
fn update_mode_overwrites_and_skips_comparison() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_nav", "nav.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(10, 10, WHITE)).unwrap();

    let config = RunConfig::default().with_update_snapshots(true);
    let id = identity(&tmp, "test_nav");
    let new_bytes = png(12, 12, BLACK);

    let outcome = SnapshotComparator::new(&config)
        .compare(&id, new_bytes.clone().into(), &CompareOptions::named("nav.png"))
        .unwrap();

    assert_eq!(outcome, Outcome::ReviewRequired { baseline: path.clone() });
    assert_eq!(fs::read(&path).unwrap(), new_bytes);
    assert!(!failures(tmp.path(), "test_nav").exists());
}

#[test]
fn update_mode_without_baseline_still_requires_review() {
    let tmp = TempDir::new().unwrap();
    let config = RunConfig::default().with_update_snapshots(true);
    let id = identity(&tmp, "test_footer");
    let bytes = png(3, 3, WHITE);

    let outcome = SnapshotComparator::new(&config)
        .compare(&id, bytes.clone().into(), &CompareOptions::named("footer.png"))
        .unwrap();

    let path = baseline(&tmp, "test_footer", "footer.png");
    assert_eq!(outcome, Outcome::ReviewRequired { baseline: path.clone() });
    assert_eq!(fs::read(path).unwrap(), bytes);
}

#[test_case(0.0 ; "zero threshold")]
#[test_case(0.1 ; "default threshold")]
#[test_case(1.0 ; "maximum threshold")]
fn baseline_matches_itself(threshold: f64) {
    let tmp = TempDir::new().unwrap();
    let bytes = png(16, 16, [90, 120, 30, 200]);
    let path = baseline(&tmp, "test_self", "self.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, &bytes).unwrap();

    let config = RunConfig::default();
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_self"),
            bytes.into(),
            &CompareOptions::named("self.png").with_threshold(threshold),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Pass);
}

#[test]
fn dimension_mismatch_is_a_mismatch() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_size", "size.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(10, 10, WHITE)).unwrap();

    let config = RunConfig::default();
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_size"),
            png(10, 12, WHITE).into(),
            &CompareOptions::named("size.png"),
        )
        .unwrap();

    match outcome {
        Outcome::Mismatch {
            artifact_dir,
            mismatched_pixels,
        } => {
            assert_eq!(mismatched_pixels, 20);
            let diff = image::open(artifact_dir.join("Diff_size.png")).unwrap();
            assert_eq!((diff.width(), diff.height()), (10, 12));
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

// Slightly darker grey: differs at threshold 0, passes at 0.1.
const LIGHT: [u8; 4] = [200, 200, 200, 255];
const LIGHTER: [u8; 4] = [204, 200, 200, 255];

fn compare_light_pair(config: &RunConfig, threshold: Option<f64>) -> Outcome {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_tone", "tone.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(4, 4, LIGHT)).unwrap();

    let mut options = CompareOptions::named("tone.png");
    options.threshold = threshold;
    SnapshotComparator::new(config)
        .compare(&identity(&tmp, "test_tone"), png(4, 4, LIGHTER).into(), &options)
        .unwrap()
}

#[test]
fn threshold_precedence() {
    // Built-in default 0.1 tolerates the small shift.
    assert!(compare_light_pair(&RunConfig::default(), None).is_pass());

    // Run-level setting beats the default.
    let strict = RunConfig::default().with_setting(THRESHOLD_KEY, "0");
    assert!(!compare_light_pair(&strict, None).is_pass());

    // Per-call override beats the run-level setting.
    assert!(compare_light_pair(&strict, Some(0.1)).is_pass());
}

#[test]
fn fail_fast_reports_a_single_pixel() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_fast", "fast.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(10, 10, WHITE)).unwrap();

    let config = RunConfig::default();
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_fast"),
            png(10, 10, BLACK).into(),
            &CompareOptions::named("fast.png").with_fail_fast(true),
        )
        .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Mismatch {
            mismatched_pixels: 1,
            ..
        }
    ));
}

#[test]
fn configured_failure_directory_is_used() {
    let tmp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_root", "root.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(5, 5, WHITE)).unwrap();

    let config = RunConfig::default()
        .with_setting(FAILURE_DIRECTORY_KEY, out.path().to_string_lossy());
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_root[1]"),
            png(5, 5, BLACK).into(),
            &CompareOptions::named("root.png"),
        )
        .unwrap();

    let expected_dir = failures(out.path(), "test_root[1]");
    assert!(matches!(
        outcome,
        Outcome::Mismatch { ref artifact_dir, .. } if *artifact_dir == expected_dir
    ));
    assert!(!tmp.path().join("snapshot_tests_failures").exists());
}

#[test]
fn corrupt_capture_is_an_error_not_a_failure() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_bad", "bad.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(5, 5, WHITE)).unwrap();

    let config = RunConfig::default();
    let result = SnapshotComparator::new(&config).compare(
        &identity(&tmp, "test_bad"),
        b"not an image".to_vec().into(),
        &CompareOptions::named("bad.png"),
    );

    assert!(matches!(result, Err(playwright_visual::Error::Image(_))));
}

struct FakePage {
    bytes: Vec<u8>,
    calls: Cell<usize>,
}

impl Screenshot for FakePage {
    fn screenshot(&self, options: &ScreenshotOptions) -> playwright_visual::Result<Vec<u8>> {
        assert_eq!(*options, ScreenshotOptions::for_snapshot());
        self.calls.set(self.calls.get() + 1);
        Ok(self.bytes.clone())
    }
}

#[test]
fn live_capture_is_taken_once() {
    let tmp = TempDir::new().unwrap();
    let page = FakePage {
        bytes: png(6, 6, WHITE),
        calls: Cell::new(0),
    };

    let config = RunConfig::default();
    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_live"),
            CapturedInput::capture(&page),
            &CompareOptions::named("live.png"),
        )
        .unwrap();

    assert!(matches!(outcome, Outcome::NewBaseline { .. }));
    assert_eq!(page.calls.get(), 1);
}

#[test]
fn failure_messages_name_the_case() {
    let review = SnapshotFailure::ReviewRequired(PathBuf::from("a.png")).to_string();
    let created = SnapshotFailure::NewBaseline(PathBuf::from("a.png")).to_string();
    let mismatch = SnapshotFailure::Mismatch {
        artifact_dir: PathBuf::from("out"),
        mismatched_pixels: 3,
    }
    .to_string();

    assert!(review.starts_with("--> Snapshots updated. Please review images."));
    assert!(created.starts_with("--> New snapshot(s) created. Please review images."));
    assert!(mismatch.starts_with("--> Snapshots DO NOT match!"));
}

#[test]
#[should_panic(expected = "New snapshot(s) created")]
fn assert_snapshot_panics_on_new_baseline() {
    let tmp = TempDir::new().unwrap();
    let snapshot = VisualSnapshot::new(
        RunConfig::default(),
        tmp.path().join("test_pages.py"),
        "test_panic",
    );
    snapshot.assert_snapshot(png(2, 2, WHITE), &CompareOptions::default());
}

#[test]
fn assert_snapshot_passes_silently() {
    let tmp = TempDir::new().unwrap();
    let snapshot = VisualSnapshot::new(
        RunConfig::default(),
        tmp.path().join("test_pages.py"),
        "test_quiet",
    );
    let bytes = png(2, 2, WHITE);

    assert!(snapshot.check(bytes.clone(), &CompareOptions::default()).is_ok());
    snapshot.assert_snapshot(bytes, &CompareOptions::default());
}

#[test]
fn unnamed_test_keeps_sibling_artifacts() {
    let tmp = TempDir::new().unwrap();
    let sibling = failures(tmp.path(), "test_other");
    fs::create_dir_all(&sibling).unwrap();
    fs::write(sibling.join("Diff_other.png"), png(1, 1, BLACK)).unwrap();

    let config = RunConfig::default();
    for test_name in ["", ".", ".."] {
        let outcome = SnapshotComparator::new(&config)
            .compare(
                &identity(&tmp, test_name),
                png(2, 2, WHITE).into(),
                &CompareOptions::named("a.png"),
            )
            .unwrap();
        assert!(matches!(outcome, Outcome::NewBaseline { .. } | Outcome::Pass));
    }

    assert!(sibling.join("Diff_other.png").exists());
    assert!(baseline(&tmp, "_", "a.png").exists());
}

#[test_case("nested/b.png" ; "relative with separator")]
#[test_case("../b.png" ; "parent directory")]
#[test_case(".." ; "bare parent")]
#[test_case("" ; "empty")]
fn snapshot_name_must_be_a_file_name(name: &str) {
    let tmp = TempDir::new().unwrap();
    let config = RunConfig::default();

    let result = SnapshotComparator::new(&config).compare(
        &identity(&tmp, "test_escape"),
        png(2, 2, WHITE).into(),
        &CompareOptions::named(name),
    );

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!tmp.path().join("snapshots").exists());
    assert!(!tmp.path().join("b.png").exists());
}

#[test]
fn absolute_snapshot_name_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let target = elsewhere.path().join("escaped.png");
    let config = RunConfig::default();

    let result = SnapshotComparator::new(&config).compare(
        &identity(&tmp, "test_escape"),
        png(2, 2, WHITE).into(),
        &CompareOptions::named(target.to_string_lossy()),
    );

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!target.exists());
}

#[test]
fn update_mode_ignores_an_unparsable_threshold() {
    let tmp = TempDir::new().unwrap();
    let config = RunConfig::default()
        .with_update_snapshots(true)
        .with_setting(THRESHOLD_KEY, "loose");

    let outcome = SnapshotComparator::new(&config)
        .compare(
            &identity(&tmp, "test_loose"),
            png(3, 3, WHITE).into(),
            &CompareOptions::named("loose.png"),
        )
        .unwrap();
    assert!(matches!(outcome, Outcome::ReviewRequired { .. }));

    // Once a comparison has to run, the bad setting is reported.
    let comparing = RunConfig::default().with_setting(THRESHOLD_KEY, "loose");
    let result = SnapshotComparator::new(&comparing).compare(
        &identity(&tmp, "test_loose"),
        png(3, 3, WHITE).into(),
        &CompareOptions::named("loose.png"),
    );
    assert!(matches!(result, Err(Error::InvalidConfig(_))));

    // A per-call threshold means the setting is never consulted.
    let outcome = SnapshotComparator::new(&comparing)
        .compare(
            &identity(&tmp, "test_loose"),
            png(3, 3, WHITE).into(),
            &CompareOptions::named("loose.png").with_threshold(0.1),
        )
        .unwrap();
    assert_eq!(outcome, Outcome::Pass);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn mismatch_is_logged_at_info() {
    let tmp = TempDir::new().unwrap();
    let path = baseline(&tmp, "test_logged", "logged.png");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, png(4, 4, WHITE)).unwrap();

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let config = RunConfig::default();
    let outcome = tracing::subscriber::with_default(subscriber, || {
        SnapshotComparator::new(&config)
            .compare(
                &identity(&tmp, "test_logged"),
                png(4, 4, BLACK).into(),
                &CompareOptions::named("logged.png"),
            )
            .unwrap()
    });
    assert!(matches!(outcome, Outcome::Mismatch { .. }));

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let line = output
        .lines()
        .find(|l| l.contains("does not match"))
        .expect("mismatch line logged");
    assert!(line.contains("INFO"), "{}", line);
    assert!(!output.contains("WARN"), "{}", output);
}
