//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support", features = ["serde"] }
//! ```
//!
//! Then in tests:
//! ```rust
//! use test_support::{init_tracing, fixtures_dir};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _root = fixtures_dir();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::{env, path::{Path, PathBuf}};

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Snapshot settings shared by every snapshot test.
///
/// - Centralizes snapshot files in `tests/snapshots` (relative to the test source file)
/// - Omits `Expression:` in snapshot headers for cleaner diffs
/// - Sorts map keys so JSON snapshots do not depend on map ordering
///
/// Settings are thread-local, so bind them around each assertion:
/// `insta_settings().bind(|| insta::assert_snapshot!(...))`.
pub fn insta_settings() -> insta::Settings {
    let mut settings = insta::Settings::clone_current();
    settings.set_snapshot_path("../snapshots");
    settings.set_omit_expression(true);
    settings.set_sort_maps(true);
    settings
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Uses the package directory (where `Cargo.toml` lives), so it's stable regardless
/// of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests dir")
        .join("fixtures")
}

/// Return the path to the repository's `tests/schemas` directory.
pub fn schemas_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests dir")
        .join("schemas")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Deserialize a JSON fixture into `T` (enable `serde` feature).
#[cfg(feature = "serde")]
pub fn read_fixture_json<T, P>(rel_path: P) -> T
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = fixtures_dir().join(rel_path);
    let file = std::fs::File::open(&path)
        .unwrap_or_else(|e| panic!("failed to open fixture {}: {e}", path.display()));
    serde_json::from_reader::<_, T>(file)
        .unwrap_or_else(|e| panic!("failed to parse JSON fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Copy the fixture directory `rel` (flat, files only) into `dest/rel`, returning the copy.
///
/// Tests that let the binary write next to its inputs work on a copy so the
/// checked-in fixtures stay pristine.
pub fn copy_fixture_dir(rel: &str, dest: &Path) -> PathBuf {
    let src = fixtures_dir().join(rel);
    let out = dest.join(rel);
    std::fs::create_dir_all(&out).expect("create fixture copy dir");
    for entry in std::fs::read_dir(&src).unwrap_or_else(|e| panic!("read {}: {e}", src.display())) {
        let path = entry.expect("dir entry").path();
        if path.is_file() {
            let name = path.file_name().expect("file name");
            std::fs::copy(&path, out.join(name)).expect("copy fixture");
        }
    }
    out
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
    EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// `RUST_LOG` is cleared so log output on stderr stays at the binary's defaults.
///
/// Example:
/// ```no_run
/// use test_support::cmd_bin;
/// use predicates::prelude::*;
///
/// let mut cmd = cmd_bin("my-cli");
/// cmd.arg("--help").assert().success().stdout(predicate::str::contains("Usage"));
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    let mut cmd = assert_cmd::Command::cargo_bin(bin).expect("binary target not found");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
    prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    pub fn set_many(kv: &[(&str, &str)]) -> Self {
        let mut prev = Vec::with_capacity(kv.len());
        for (k, v) in kv {
            let k_owned = k.to_string();
            prev.push((k_owned.clone(), env::var(k).ok()));
            env::set_var(k, v);
        }
        Self { prev }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (k, old) in self.prev.drain(..) {
            match old {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}
