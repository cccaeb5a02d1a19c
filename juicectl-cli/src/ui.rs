//! Console helpers for juicectl
//!
//! Report lines go to stdout through `println!`; spinners draw on stderr and
//! are suppressed when:
//! - `--quiet` flag is passed
//! - `JUICECTL_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output, cron, CI)

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub const OK: &str = "✓";
pub const FAIL: &str = "✗";
pub const WARN: &str = "⚠";

static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Call once at startup with the --quiet flag value.
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("JUICECTL_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&true)
}

/// Returns None in quiet mode
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

fn finish(pb: Option<ProgressBar>, marker: &str, msg: String) {
    if let Some(pb) = pb {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            pb.set_style(style);
        }
        pb.finish_with_message(format!("{marker} {msg}"));
    }
}

/// Run a future under a spinner, finishing with ✓ or ✗.
/// In quiet mode, just runs the future.
pub async fn with_spinner<T, E: std::fmt::Display>(
    msg: impl Into<String>,
    success_msg: impl Into<String>,
    f: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let msg = msg.into();
    let pb = spinner(&msg);

    match f.await {
        Ok(result) => {
            finish(pb, OK, success_msg.into());
            Ok(result)
        }
        Err(e) => {
            finish(pb, FAIL, format!("{msg}: {e}"));
            Err(e)
        }
    }
}
