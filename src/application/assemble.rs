//! Final concatenation of committed artifacts into the output document.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Instant,
};

use thiserror::Error;
use tracing::{info, warn};

use crate::application::pagination::OutputArtifact;
use crate::application::typeset::{TypesetError, Typesetter};

const STAGED_OUTPUT: &str = "assembled.pdf";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("nothing to assemble")]
    Empty,
    #[error("artifact for units {start}..{end} is out of order (expected start {expected})")]
    OutOfOrder {
        start: usize,
        end: usize,
        expected: usize,
    },
    #[error("artifact {} is missing", path.display())]
    MissingArtifact { path: PathBuf },
    #[error("concatenation failed: {0}")]
    Typeset(#[from] TypesetError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Final document written by [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub path: PathBuf,
    pub artifacts: usize,
    pub units: usize,
}

/// Concatenate `artifacts` in commit order into `output`.
///
/// The concatenated document is produced inside `staging_dir` first and only
/// moved into place once complete, so a failure leaves `output` untouched.
pub fn assemble(
    artifacts: &[OutputArtifact],
    output: &Path,
    staging_dir: &Path,
    typesetter: &dyn Typesetter,
) -> Result<AssembledDocument, AssemblyError> {
    let started_at = Instant::now();
    validate(artifacts)?;

    let staged = staging_dir.join(STAGED_OUTPUT);
    match artifacts {
        [single] => fs::copy(&single.path, &staged)
            .map(|_| ())
            .map_err(|source| AssemblyError::Io {
                path: staged.clone(),
                source,
            })?,
        _ => {
            let inputs: Vec<PathBuf> = artifacts.iter().map(|artifact| artifact.path.clone()).collect();
            typesetter.concatenate(&inputs, &staged).inspect_err(|err| {
                warn!(
                    target = "application::assemble",
                    op = "assemble",
                    result = "error",
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    error = %err,
                    "Concatenation failed"
                );
            })?;
        }
    }

    publish(&staged, output)?;

    let units = artifacts.last().map(|artifact| artifact.units.end).unwrap_or(0);
    info!(
        target = "application::assemble",
        op = "assemble",
        result = "ok",
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        artifacts = artifacts.len(),
        units,
        output = %output.display(),
        "Document assembled"
    );

    Ok(AssembledDocument {
        path: output.to_path_buf(),
        artifacts: artifacts.len(),
        units,
    })
}

fn validate(artifacts: &[OutputArtifact]) -> Result<(), AssemblyError> {
    if artifacts.is_empty() {
        return Err(AssemblyError::Empty);
    }

    let mut expected = 0;
    for artifact in artifacts {
        if artifact.units.start != expected || artifact.units.end <= artifact.units.start {
            return Err(AssemblyError::OutOfOrder {
                start: artifact.units.start,
                end: artifact.units.end,
                expected,
            });
        }
        expected = artifact.units.end;
    }

    if let Some(missing) = artifacts.iter().find(|artifact| !artifact.path.is_file()) {
        return Err(AssemblyError::MissingArtifact {
            path: missing.path.clone(),
        });
    }

    Ok(())
}

/// Move the staged file over `output`, copying when a rename is not possible.
fn publish(staged: &Path, output: &Path) -> Result<(), AssemblyError> {
    let io_error = |source| AssemblyError::Io {
        path: output.to_path_buf(),
        source,
    };

    if fs::rename(staged, output).is_ok() {
        return Ok(());
    }

    fs::copy(staged, output).map_err(io_error)?;
    fs::remove_file(staged).map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct AppendingTypesetter {
        calls: RefCell<Vec<Vec<PathBuf>>>,
        fail: bool,
    }

    impl Typesetter for AppendingTypesetter {
        fn html_to_pdf(&self, _html: &Path, _pdf: &Path) -> Result<(), TypesetError> {
            unreachable!("assembly never typesets")
        }

        fn page_count(&self, _pdf: &Path) -> Result<u32, TypesetError> {
            unreachable!("assembly never counts pages")
        }

        fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), TypesetError> {
            self.calls.borrow_mut().push(inputs.to_vec());
            if self.fail {
                return Err(TypesetError::Tool {
                    tool: "pdfunite".to_string(),
                    exit_code: Some(1),
                    stderr: "broken pdf".to_string(),
                });
            }
            let mut joined = String::new();
            for input in inputs {
                joined.push_str(&fs::read_to_string(input).expect("input"));
            }
            fs::write(output, joined).expect("output");
            Ok(())
        }
    }

    fn write_artifact(dir: &Path, units: std::ops::Range<usize>, body: &str) -> OutputArtifact {
        let path = dir.join(format!("output.{:05}.pdf", units.start));
        fs::write(&path, body).expect("artifact");
        OutputArtifact {
            units,
            pages: 1,
            path,
        }
    }

    #[test]
    fn concatenates_in_commit_order() {
        let workspace = TempDir::new().expect("workspace");
        let out_dir = TempDir::new().expect("out");
        let artifacts = vec![
            write_artifact(workspace.path(), 0..2, "A"),
            write_artifact(workspace.path(), 2..3, "B"),
            write_artifact(workspace.path(), 3..5, "C"),
        ];
        let typesetter = AppendingTypesetter::default();
        let output = out_dir.path().join("final.pdf");

        let document =
            assemble(&artifacts, &output, workspace.path(), &typesetter).expect("assemble");

        assert_eq!(fs::read_to_string(&output).expect("output"), "ABC");
        assert_eq!(document.artifacts, 3);
        assert_eq!(document.units, 5);
        assert_eq!(typesetter.calls.borrow().len(), 1);
        assert!(!workspace.path().join(STAGED_OUTPUT).exists());
    }

    #[test]
    fn single_artifact_is_copied_without_concatenation() {
        let workspace = TempDir::new().expect("workspace");
        let artifacts = vec![write_artifact(workspace.path(), 0..1, "only")];
        let typesetter = AppendingTypesetter::default();
        let output = workspace.path().join("final.pdf");

        assemble(&artifacts, &output, workspace.path(), &typesetter).expect("assemble");

        assert_eq!(fs::read_to_string(&output).expect("output"), "only");
        assert!(typesetter.calls.borrow().is_empty());
        assert!(artifacts[0].path.is_file());
    }

    #[test]
    fn rejects_gaps_and_reordering() {
        let workspace = TempDir::new().expect("workspace");
        let artifacts = vec![
            write_artifact(workspace.path(), 2..4, "B"),
            write_artifact(workspace.path(), 0..2, "A"),
        ];
        let output = workspace.path().join("final.pdf");

        let err = assemble(
            &artifacts,
            &output,
            workspace.path(),
            &AppendingTypesetter::default(),
        )
        .expect_err("out of order");

        assert!(matches!(err, AssemblyError::OutOfOrder { expected: 0, .. }), "{err:?}");
        assert!(!output.exists());
    }

    #[test]
    fn missing_artifact_fails_before_output_is_touched() {
        let workspace = TempDir::new().expect("workspace");
        let mut artifacts = vec![
            write_artifact(workspace.path(), 0..1, "A"),
            write_artifact(workspace.path(), 1..2, "B"),
        ];
        artifacts[1].path = workspace.path().join("output.99999.pdf");
        let output = workspace.path().join("final.pdf");
        fs::write(&output, "previous").expect("existing output");
        let typesetter = AppendingTypesetter::default();

        let err =
            assemble(&artifacts, &output, workspace.path(), &typesetter).expect_err("missing");

        assert!(matches!(err, AssemblyError::MissingArtifact { .. }), "{err:?}");
        assert!(typesetter.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&output).expect("output"), "previous");
    }

    #[test]
    fn concatenation_failure_leaves_no_output() {
        let workspace = TempDir::new().expect("workspace");
        let artifacts = vec![
            write_artifact(workspace.path(), 0..1, "A"),
            write_artifact(workspace.path(), 1..2, "B"),
        ];
        let typesetter = AppendingTypesetter {
            fail: true,
            ..Default::default()
        };
        let output = workspace.path().join("final.pdf");

        let err = assemble(&artifacts, &output, workspace.path(), &typesetter).expect_err("fail");

        assert!(matches!(err, AssemblyError::Typeset(_)), "{err:?}");
        assert!(!output.exists());
    }

    #[test]
    fn empty_artifact_list_is_rejected() {
        let workspace = TempDir::new().expect("workspace");
        let err = assemble(
            &[],
            &workspace.path().join("final.pdf"),
            workspace.path(),
            &AppendingTypesetter::default(),
        )
        .expect_err("empty");
        assert!(matches!(err, AssemblyError::Empty));
    }
}
