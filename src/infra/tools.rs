use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    time::Instant,
};

use tracing::{debug, warn};

use crate::application::typeset::{TypesetError, Typesetter, parse_page_count};
use crate::config::TypesetSettings;

const PRINCE: &str = "prince";
const PDFINFO: &str = "pdfinfo";
const PDFUNITE: &str = "pdfunite";

/// `Typesetter` backed by Prince and the poppler command line utilities.
#[derive(Debug, Clone)]
pub struct ExternalTools {
    prince_path: PathBuf,
    pdf_profile: Option<String>,
    pdfinfo_path: PathBuf,
    pdfunite_path: PathBuf,
}

impl ExternalTools {
    pub fn new(
        prince_path: impl Into<PathBuf>,
        pdfinfo_path: impl Into<PathBuf>,
        pdfunite_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prince_path: prince_path.into(),
            pdf_profile: None,
            pdfinfo_path: pdfinfo_path.into(),
            pdfunite_path: pdfunite_path.into(),
        }
    }

    /// PDF profile passed to Prince as `--pdf-profile`; `None` omits the flag.
    pub fn with_pdf_profile(mut self, profile: Option<String>) -> Self {
        self.pdf_profile = profile.filter(|value| !value.trim().is_empty());
        self
    }
}

impl From<&TypesetSettings> for ExternalTools {
    fn from(settings: &TypesetSettings) -> Self {
        Self::new(
            settings.prince_path.clone(),
            settings.pdfinfo_path.clone(),
            settings.pdfunite_path.clone(),
        )
        .with_pdf_profile(settings.pdf_profile.clone())
    }
}

impl Typesetter for ExternalTools {
    fn html_to_pdf(&self, html: &Path, pdf: &Path) -> Result<(), TypesetError> {
        let mut command = Command::new(&self.prince_path);
        command.arg(html);
        if let Some(profile) = &self.pdf_profile {
            command.arg(format!("--pdf-profile={profile}"));
        }
        command.arg("-o").arg(pdf);

        run_tool(PRINCE, "tools::html_to_pdf", command)?;
        ensure_output(PRINCE, pdf)
    }

    fn page_count(&self, pdf: &Path) -> Result<u32, TypesetError> {
        let mut command = Command::new(&self.pdfinfo_path);
        command.arg(pdf);

        let output = run_tool(PDFINFO, "tools::page_count", command)?;
        let report = String::from_utf8_lossy(&output.stdout);
        parse_page_count(&report)
    }

    fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), TypesetError> {
        let mut command = Command::new(&self.pdfunite_path);
        command.args(inputs).arg(output);

        run_tool(PDFUNITE, "tools::concatenate", command)?;
        ensure_output(PDFUNITE, output)
    }
}

fn run_tool(tool: &str, op: &'static str, mut command: Command) -> Result<Output, TypesetError> {
    let started_at = Instant::now();
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| {
            warn!(
                target = "infra::tools",
                op,
                tool,
                result = "error",
                elapsed_ms = started_at.elapsed().as_millis() as u64,
                error_code = "spawn",
                error = %err,
                "Failed to spawn external tool"
            );
            if err.kind() == ErrorKind::NotFound {
                TypesetError::NotFound {
                    tool: tool.to_string(),
                    source: err,
                }
            } else {
                TypesetError::Io {
                    tool: tool.to_string(),
                    source: err,
                }
            }
        })?;

    if !output.status.success() {
        let exit_code = output.status.code();
        let exit_code_value = exit_code.map(i64::from).unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            target = "infra::tools",
            op,
            tool,
            result = "error",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            exit_code = exit_code_value,
            error_code = "exit_status",
            stderr = %stderr,
            "External tool failed"
        );
        return Err(TypesetError::Tool {
            tool: tool.to_string(),
            exit_code,
            stderr,
        });
    }

    debug!(
        target = "infra::tools",
        op,
        tool,
        result = "ok",
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "External tool finished"
    );

    Ok(output)
}

fn ensure_output(tool: &str, path: &Path) -> Result<(), TypesetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TypesetError::MissingOutput {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        })
    }
}
