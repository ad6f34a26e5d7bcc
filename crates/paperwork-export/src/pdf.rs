use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ExportError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long to wait for the stderr reader once the converter has exited.
const STDERR_GRACE: Duration = Duration::from_secs(2);
/// Bytes of converter stderr kept in error messages (the tail).
const STDERR_LIMIT: usize = 4096;

/// Converts a saved DOCX to PDF by running a headless office suite:
/// `<program> [extra_args..] --headless --convert-to pdf --outdir <dir> <source>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfConverter {
    pub program: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Seconds to wait before the converter is killed.
    pub timeout_secs: u64,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self {
            program: "soffice".to_string(),
            extra_args: Vec::new(),
            timeout_secs: 120,
        }
    }
}

impl PdfConverter {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Convert `source` into `out_dir`, returning the path of the new PDF.
    pub fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ExportError> {
        let stem = source
            .file_stem()
            .ok_or_else(|| ExportError::Conversion(format!("{} has no file name", source.display())))?;
        let mut pdf_name = stem.to_os_string();
        pdf_name.push(".pdf");
        let target = out_dir.join(pdf_name);

        info!(
            program = %self.program,
            source = %source.display(),
            out_dir = %out_dir.display(),
            "converting to PDF"
        );

        let mut child = Command::new(&self.program)
            .args(&self.extra_args)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ExportError::Conversion(format!("failed to start `{}`: {e}", self.program))
            })?;

        // Drained while the converter runs; the pipe buffer is finite.
        let stderr = child.stderr.take().map(|mut pipe| {
            let (tx, rx) = mpsc::channel();
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
            rx
        });

        let deadline = Instant::now() + self.timeout();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExportError::Conversion(format!(
                        "`{}` did not finish within {}s",
                        self.program, self.timeout_secs
                    )));
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(ExportError::Conversion(format!(
                        "failed to wait for `{}`: {e}",
                        self.program
                    )));
                }
            }
        };

        if !status.success() {
            let stderr = stderr
                .and_then(|rx| rx.recv_timeout(STDERR_GRACE).ok())
                .unwrap_or_default();
            return Err(ExportError::Conversion(format!(
                "`{}` exited with {status}: {}",
                self.program,
                tail(stderr.trim(), STDERR_LIMIT)
            )));
        }

        if !target.is_file() {
            return Err(ExportError::Conversion(format!(
                "`{}` reported success but {} was not produced",
                self.program,
                target.display()
            )));
        }

        debug!(pdf = %target.display(), "PDF written");
        Ok(target)
    }
}

fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
