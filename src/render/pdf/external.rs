use super::{EngineKind, PdfEngine, inject_base_tag};
use crate::error::PipelineError;
use log::debug;
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

const CHROMIUM_PROGRAMS: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Looks for an executable called `name` in `dirs`.
pub fn find_program_in<I>(name: &str, dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    for dir in dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", name));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Looks for an executable on `PATH`.
pub fn find_program(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    find_program_in(name, env::split_paths(&path))
}

/// An HTML → PDF converter run as a child process.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    kind: EngineKind,
    programs: Vec<String>,
}

impl ExternalEngine {
    pub fn new(kind: EngineKind, programs: &[&str]) -> Self {
        Self {
            kind,
            programs: programs.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn chromium() -> Self {
        Self::new(EngineKind::Chromium, CHROMIUM_PROGRAMS)
    }

    pub fn wkhtmltopdf() -> Self {
        Self::new(EngineKind::Wkhtmltopdf, &["wkhtmltopdf"])
    }

    pub fn weasyprint() -> Self {
        Self::new(EngineKind::Weasyprint, &["weasyprint"])
    }

    /// First of the candidate programs found on `PATH`.
    pub fn program(&self) -> Option<PathBuf> {
        self.programs.iter().find_map(|p| find_program(p))
    }

    fn command(&self, program: &Path, input: &Path, out: &Path, base_url: Option<&str>) -> Command {
        let mut cmd = Command::new(program);
        match self.kind {
            EngineKind::Chromium => {
                cmd.args([
                    "--headless",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--no-pdf-header-footer",
                    "--run-all-compositor-stages-before-draw",
                ]);
                cmd.arg(format!("--print-to-pdf={}", out.display()));
                cmd.arg(super::ensure_file_url(&input.to_string_lossy()));
            }
            EngineKind::Wkhtmltopdf => {
                cmd.args(["--quiet", "--enable-local-file-access", "--encoding", "utf-8", "--page-size", "A4"]);
                cmd.arg(input).arg(out);
            }
            EngineKind::Weasyprint => {
                if let Some(base) = base_url {
                    cmd.arg("--base-url").arg(base);
                }
                cmd.arg(input).arg(out);
            }
            EngineKind::Builtin => {}
        }
        cmd
    }
}

impl PdfEngine for ExternalEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.kind != EngineKind::Builtin && self.program().is_some()
    }

    fn render(&self, html: &str, out: &Path, base_url: Option<&str>) -> Result<(), PipelineError> {
        let program = self
            .program()
            .ok_or_else(|| PipelineError::PdfRender(format!("{} not found on PATH", self.kind)))?;

        let dir = match out.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut input = tempfile::Builder::new()
            .prefix(".tradedoc-")
            .suffix(".html")
            .tempfile_in(&dir)?;
        input.write_all(inject_base_tag(html, base_url).as_bytes())?;
        input.flush()?;

        let mut cmd = self.command(&program, input.path(), out, base_url);
        debug!("Running {:?}", cmd);
        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(5)..].join(" | ");
            return Err(PipelineError::PdfRender(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                tail
            )));
        }

        match fs::metadata(out) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(PipelineError::PdfRender(format!(
                "{} produced no output at {}",
                program.display(),
                out.display()
            ))),
        }
    }
}
