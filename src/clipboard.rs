use crate::chunk::Chunk;
use crate::error::EditError;
use crate::textcodec;

/// Holds the most recently yanked or cut chunk.
///
/// The register is format-agnostic: whatever dataset the chunk came from,
/// pasting reshapes it to the target (see `editor::insert`).
pub struct Clipboard {
    chunk: Option<Chunk>,
    max_cells: usize,
}

impl Clipboard {
    pub fn new(max_cells: usize) -> Self {
        Self {
            chunk: None,
            max_cells,
        }
    }

    pub fn yank(&mut self, chunk: Chunk) {
        self.chunk = Some(chunk);
    }

    pub fn chunk(&self) -> Option<&Chunk> {
        self.chunk.as_ref()
    }

    /// Copy the register to the system clipboard as whitespace text.
    pub fn to_system(&self) -> Result<String, String> {
        let Some(chunk) = self.chunk.as_ref() else {
            return Err("Nothing to copy".to_string());
        };
        copy_to_system_clipboard(&textcodec::chunk_to_text(chunk))?;
        Ok(format!("Copied {} row(s) to system clipboard", chunk.row_count()))
    }

    /// Fill the register from the system clipboard (parsed as whitespace
    /// text; one bad token rejects the whole paste).
    pub fn from_system(&mut self) -> Result<String, String> {
        let text = paste_from_system_clipboard()?;
        if text.is_empty() {
            return Err("System clipboard is empty".to_string());
        }
        let chunk = textcodec::from_text(&text).map_err(|e| e.to_string())?;
        let cells: usize = chunk.to_rows().iter().map(|r| r.len()).sum();
        if cells > self.max_cells {
            return Err(EditError::CapacityExceeded {
                cells,
                max: self.max_cells,
            }
            .to_string());
        }
        let rows = chunk.row_count();
        self.chunk = Some(chunk);
        Ok(format!("Yanked {} row(s) from system clipboard", rows))
    }
}

/// Copy text to the system clipboard using a platform-appropriate method.
fn copy_to_system_clipboard(text: &str) -> Result<(), String> {
    // Command-line tools are more reliable with terminal apps on Linux.
    #[cfg(target_os = "linux")]
    {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let commands = [
            ("wl-copy", vec![]),
            ("xclip", vec!["-selection", "clipboard"]),
            ("xsel", vec!["--clipboard", "--input"]),
        ];

        for (cmd, args) in commands {
            if let Ok(mut child) = Command::new(cmd)
                .args(&args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
            {
                if let Some(mut stdin) = child.stdin.take() {
                    if stdin.write_all(text.as_bytes()).is_ok() {
                        drop(stdin);
                        if child.wait().map(|s| s.success()).unwrap_or(false) {
                            return Ok(());
                        }
                    }
                }
            }
        }

        return Err("No clipboard tool found (install xclip or wl-copy)".to_string());
    }

    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| format!("Clipboard error: {}", e))?;
        clipboard
            .set_text(text)
            .map_err(|e| format!("Clipboard error: {}", e))?;
        Ok(())
    }
}

/// Paste text from the system clipboard using a platform-appropriate method.
fn paste_from_system_clipboard() -> Result<String, String> {
    #[cfg(target_os = "linux")]
    {
        use std::process::Command;

        let commands = [
            ("wl-paste", vec!["--no-newline"]),
            ("xclip", vec!["-selection", "clipboard", "-o"]),
            ("xsel", vec!["--clipboard", "--output"]),
        ];

        for (cmd, args) in commands {
            if let Ok(output) = Command::new(cmd).args(&args).output() {
                if output.status.success() {
                    return String::from_utf8(output.stdout)
                        .map_err(|_| "Clipboard contains invalid UTF-8".to_string());
                }
            }
        }

        return Err("No clipboard tool found (install xclip or wl-copy)".to_string());
    }

    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| format!("Clipboard error: {}", e))?;
        clipboard
            .get_text()
            .map_err(|e| format!("Clipboard error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_starts_empty() {
        let clipboard = Clipboard::new(100);
        assert!(clipboard.chunk().is_none());
        assert!(clipboard.to_system().is_err());
    }

    #[test]
    fn test_yank_replaces_register() {
        let mut clipboard = Clipboard::new(100);
        clipboard.yank(Chunk::Rect {
            rows: 1,
            cols: 1,
            cells: vec![1.0],
        });
        clipboard.yank(Chunk::Jagged {
            lengths: vec![2],
            samples: vec![2.0, 3.0],
        });
        assert_eq!(clipboard.chunk().unwrap().row_count(), 1);
        assert!(clipboard.chunk().unwrap().is_jagged());
    }
}
