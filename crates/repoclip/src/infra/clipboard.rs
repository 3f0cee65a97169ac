//! Clipboard integration utilities.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::domain::errors::ClipboardError;

/// Destination that accepts the finished document exactly once.
pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy)]
enum Backend {
    Native,
    Command(&'static [&'static str]),
}

// X11/Wayland selections die with the owning process, so on Linux the helpers that fork
// and keep serving the selection come before the in-process clipboard.
#[cfg(target_os = "macos")]
const BACKENDS: &[Backend] = &[Backend::Native, Backend::Command(&["pbcopy"])];

#[cfg(all(unix, not(target_os = "macos")))]
const BACKENDS: &[Backend] = &[
    Backend::Command(&["wl-copy"]),
    Backend::Command(&["xclip", "-selection", "clipboard"]),
    Backend::Command(&["xsel", "--clipboard", "--input"]),
    Backend::Native,
];

#[cfg(target_os = "windows")]
const BACKENDS: &[Backend] = &[
    Backend::Native,
    Backend::Command(&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]),
];

#[cfg(not(any(unix, target_os = "windows")))]
const BACKENDS: &[Backend] = &[Backend::Native];

/// Cross-platform clipboard helper with fallbacks for headless environments.
#[derive(Default)]
pub struct Clipboard {
    native: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn native_copy(&mut self, text: &str) -> Result<(), String> {
        if self.native.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|err| format!("native: {err}"))?;
            self.native = Some(clipboard);
        }
        let Some(native) = self.native.as_mut() else {
            return Err("native: clipboard not initialized".into());
        };
        native
            .set_text(text.to_owned())
            .map_err(|err| format!("native: {err}"))
    }
}

impl ClipboardSink for Clipboard {
    /// Try each platform backend in order until one accepts the text.
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut failures = Vec::new();
        for backend in BACKENDS {
            let result = match backend {
                Backend::Native => self.native_copy(text),
                Backend::Command(command) => try_command_copy(command, text),
            };
            match result {
                Ok(()) => {
                    tracing::debug!(backend = ?backend, "copied to clipboard");
                    return Ok(());
                }
                Err(reason) => {
                    tracing::debug!(backend = ?backend, %reason, "clipboard backend failed");
                    failures.push(reason);
                }
            }
        }
        Err(ClipboardError::new(failures.join("; ")))
    }
}

fn try_command_copy(command: &[&str], text: &str) -> Result<(), String> {
    let Some((program, args)) = command.split_first() else {
        return Err("clipboard command missing program".into());
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| format!("{program}: {err}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|err| format!("{program}: failed to write clipboard contents: {err}"))?;
    }

    let status = child
        .wait()
        .map_err(|err| format!("{program}: did not exit cleanly: {err}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{program}: exited with {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_reports_reason() {
        let err = try_command_copy(&["repoclip-definitely-not-installed"], "text").unwrap_err();
        assert!(err.starts_with("repoclip-definitely-not-installed:"));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(try_command_copy(&[], "text").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_status() {
        let err = try_command_copy(&["sh", "-c", "cat >/dev/null; exit 3"], "text").unwrap_err();
        assert!(err.contains("exited with"));
    }

    #[test]
    fn every_platform_has_a_backend() {
        assert!(!BACKENDS.is_empty());
    }
}
