//! Clipboard writer: an ordered chain of backends where the first success wins.
use std::io::{self, IsTerminal, Write};
use std::process::Stdio;

use async_trait::async_trait;
use base64::Engine as _;
use copytools_logging::{copy_debug, copy_trace};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("{0} is not available here")]
    Unavailable(&'static str),
    #[error("system clipboard: {0}")]
    Backend(#[from] arboard::Error),
    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// One way of getting text onto the clipboard.
#[async_trait(?Send)]
pub trait ClipboardBackend {
    fn name(&self) -> &'static str;
    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Tries each backend in order. Failures are logged and never surface.
#[derive(Default)]
pub struct ClipboardWriter {
    backends: Vec<Box<dyn ClipboardBackend>>,
}

impl ClipboardWriter {
    pub fn new(backends: Vec<Box<dyn ClipboardBackend>>) -> Self {
        Self { backends }
    }

    /// Full chain for the background context. Where the platform copy utility
    /// keeps serving the selection after this process exits (wl-copy, xclip),
    /// it goes ahead of the in-process clipboard.
    pub fn system() -> Self {
        Self::chain(
            Some(ArboardBackend::default()),
            CommandBackend::platform_default(),
            Osc52Backend::stdout(),
            selection_owned_by_process(),
        )
    }

    /// Native and terminal backends only, for contexts that delegate the
    /// privileged write elsewhere.
    pub fn local() -> Self {
        Self::chain(
            None,
            CommandBackend::platform_default(),
            Osc52Backend::stdout(),
            false,
        )
    }

    fn chain(
        system: Option<ArboardBackend>,
        native: Option<CommandBackend>,
        osc52: Option<Osc52Backend>,
        utility_first: bool,
    ) -> Self {
        let mut backends: Vec<Box<dyn ClipboardBackend>> = Vec::new();
        let native = native.map(|b| Box::new(b) as Box<dyn ClipboardBackend>);
        let system = system.map(|b| Box::new(b) as Box<dyn ClipboardBackend>);
        if utility_first {
            backends.extend(native);
            backends.extend(system);
        } else {
            backends.extend(system);
            backends.extend(native);
        }
        backends.extend(osc52.map(|b| Box::new(b) as Box<dyn ClipboardBackend>));
        Self::new(backends)
    }

    pub fn with_backend(mut self, backend: Box<dyn ClipboardBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub async fn write(&mut self, text: &str) -> bool {
        for backend in self.backends.iter_mut() {
            match backend.write_text(text).await {
                Ok(()) => {
                    copy_trace!("Copied {} chars via {}", text.chars().count(), backend.name());
                    return true;
                }
                Err(err) => copy_debug!("Clipboard backend {} failed: {}", backend.name(), err),
            }
        }
        false
    }
}

/// X11 and Wayland selections live only as long as their owner. An in-process
/// write is lost when a short-lived command exits.
fn selection_owned_by_process() -> bool {
    cfg!(all(unix, not(target_os = "macos")))
}

/// The system clipboard through `arboard`, opened on first use.
///
/// On X11 and Wayland the selection is owned by this process; the content stays
/// available only while the process lives unless a clipboard manager takes it over.
#[derive(Default)]
pub struct ArboardBackend {
    clipboard: Option<arboard::Clipboard>,
}

#[async_trait(?Send)]
impl ClipboardBackend for ArboardBackend {
    fn name(&self) -> &'static str {
        "system clipboard"
    }

    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.clipboard.is_none() {
            self.clipboard = Some(arboard::Clipboard::new()?);
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Err(ClipboardError::Unavailable("system clipboard"));
        };
        clipboard.set_text(text)?;
        Ok(())
    }
}

/// Pipes text into a platform copy utility. Candidates are tried in order;
/// ones missing from `PATH` are skipped.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    candidates: Vec<(String, Vec<String>)>,
}

impl CommandBackend {
    pub fn new(candidates: Vec<(String, Vec<String>)>) -> Self {
        Self { candidates }
    }

    pub fn platform_default() -> Option<Self> {
        let candidates: Vec<(&str, &[&str])> = if cfg!(target_os = "macos") {
            vec![("pbcopy", &[])]
        } else if cfg!(windows) {
            vec![("clip", &[])]
        } else {
            let mut found: Vec<(&str, &[&str])> = Vec::new();
            if std::env::var_os("WAYLAND_DISPLAY").is_some() {
                found.push(("wl-copy", &[]));
            }
            if std::env::var_os("DISPLAY").is_some() {
                found.push(("xclip", &["-selection", "clipboard"]));
                found.push(("xsel", &["--clipboard", "--input"]));
            }
            found
        };
        if candidates.is_empty() {
            return None;
        }
        Some(Self::new(
            candidates
                .into_iter()
                .map(|(program, args)| {
                    (
                        program.to_string(),
                        args.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        ))
    }

    async fn run(program: &str, args: &[String], text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClipboardError::Spawn {
                program: program.to_string(),
                source,
            })?;
        // Stdin is closed at the end of this block so the utility sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()).await,
            None => Ok(()),
        };
        let status = child.wait().await?;
        written?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                program: program.to_string(),
                status: status.to_string(),
            })
        }
    }
}

#[async_trait(?Send)]
impl ClipboardBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "copy utility"
    }

    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut last = ClipboardError::Unavailable("copy utility");
        for (program, args) in &self.candidates {
            match Self::run(program, args, text).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    copy_trace!("{} unavailable: {}", program, err);
                    last = err;
                }
            }
        }
        Err(last)
    }
}

/// Asks the terminal emulator to set the clipboard with an OSC 52 sequence.
pub struct Osc52Backend {
    out: Box<dyn Write>,
}

impl Osc52Backend {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out }
    }

    /// `None` unless stdout is a terminal.
    pub fn stdout() -> Option<Self> {
        io::stdout()
            .is_terminal()
            .then(|| Self::new(Box::new(io::stdout())))
    }

    pub fn sequence(text: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
        format!("\x1b]52;c;{encoded}\x07")
    }
}

#[async_trait(?Send)]
impl ClipboardBackend for Osc52Backend {
    fn name(&self) -> &'static str {
        "terminal (OSC 52)"
    }

    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out.write_all(Self::sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_sequence_wraps_base64_payload() {
        assert_eq!(Osc52Backend::sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[tokio::test]
    async fn missing_programs_fall_through_with_an_error() {
        let mut backend = CommandBackend::new(vec![(
            "copytools-definitely-not-installed".to_string(),
            Vec::new(),
        )]);
        let err = backend.write_text("x").await.unwrap_err();
        assert!(matches!(err, ClipboardError::Spawn { .. }));
    }

    #[test]
    fn copy_utility_goes_first_when_the_selection_dies_with_the_process() {
        let native = || Some(CommandBackend::new(vec![("xclip".to_string(), Vec::new())]));

        let detached = ClipboardWriter::chain(Some(ArboardBackend::default()), native(), None, true);
        assert_eq!(detached.backend_names(), vec!["copy utility", "system clipboard"]);

        let owned = ClipboardWriter::chain(Some(ArboardBackend::default()), native(), None, false);
        assert_eq!(owned.backend_names(), vec!["system clipboard", "copy utility"]);

        let local = ClipboardWriter::chain(None, native(), None, true);
        assert_eq!(local.backend_names(), vec!["copy utility"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn utility_exit_status_is_checked() {
        let script = |code: &str| {
            (
                "sh".to_string(),
                vec!["-c".to_string(), format!("cat > /dev/null; exit {code}")],
            )
        };

        let mut ok = CommandBackend::new(vec![script("0")]);
        ok.write_text("copied").await.unwrap();

        let mut failing = CommandBackend::new(vec![script("3")]);
        let err = failing.write_text("copied").await.unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed { ref program, .. } if program == "sh"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn utility_that_ignores_stdin_is_still_reaped() {
        // Exits before reading; the write may hit a closed pipe.
        let mut backend = CommandBackend::new(vec![(
            "sh".to_string(),
            vec!["-c".to_string(), "exit 0".to_string()],
        )]);
        let big = "x".repeat(1 << 20);
        assert!(backend.write_text(&big).await.is_err());
    }

    #[tokio::test]
    async fn empty_chain_reports_failure() {
        let mut writer = ClipboardWriter::default();
        assert!(!writer.write("x").await);
        assert!(writer.backend_names().is_empty());
    }
}
