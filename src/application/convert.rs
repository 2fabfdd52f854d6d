//! End-to-end conversion pipelines driven by the CLI.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::info;

use crate::application::assemble::assemble;
use crate::application::error::AppError;
use crate::application::pagination::{PaginationController, TypesetMeasurer};
use crate::application::render::{ComrakRenderService, DocumentStyle, RenderRequest, RenderService};
use crate::application::typeset::Typesetter;
use crate::config::Settings;
use crate::domain::units::segment;
use crate::infra::{tools::ExternalTools, workspace::Workspace};

/// Outcome of a successful PDF conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub units: usize,
    pub artifacts: usize,
    pub output: PathBuf,
}

/// Paginate `input` into a PDF at `output` using the configured external tools.
pub fn convert_to_pdf(
    input: &Path,
    output: &Path,
    settings: &Settings,
) -> Result<ConversionReport, AppError> {
    let renderer = ComrakRenderService::new(DocumentStyle::from(&settings.render))?;
    let typesetter = ExternalTools::from(&settings.typeset);
    convert_with(input, output, settings, &renderer, &typesetter)
}

/// Same pipeline as [`convert_to_pdf`] with the collaborators supplied by the caller.
pub fn convert_with(
    input: &Path,
    output: &Path,
    settings: &Settings,
    renderer: &dyn RenderService,
    typesetter: &dyn Typesetter,
) -> Result<ConversionReport, AppError> {
    let started_at = Instant::now();
    let document = read_input(input)?;
    let units = segment(&document);

    let workspace = Workspace::create(&settings.workspace)?;
    info!(
        target = "application::convert",
        input = %input.display(),
        units = units.len(),
        workspace = %workspace.path().display(),
        "Paginating document"
    );

    let mut measurer = TypesetMeasurer::new(renderer, typesetter, workspace.path())
        .with_title(settings.render.title.as_str());
    let artifacts = PaginationController::paginate(&units, &mut measurer)?;
    let assembled = assemble(&artifacts, output, workspace.path(), typesetter)?;

    workspace.close()?;

    info!(
        target = "application::convert",
        op = "convert_to_pdf",
        result = "ok",
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        units = units.len(),
        artifacts = assembled.artifacts,
        output = %assembled.path.display(),
        "Conversion finished"
    );

    Ok(ConversionReport {
        units: units.len(),
        artifacts: assembled.artifacts,
        output: assembled.path,
    })
}

/// Render the whole of `input` as one standalone HTML document.
pub fn convert_to_html(input: &Path, output: &Path, settings: &Settings) -> Result<(), AppError> {
    let started_at = Instant::now();
    let document = read_input(input)?;

    let renderer = ComrakRenderService::new(DocumentStyle::from(&settings.render))?;
    let request = RenderRequest::new(document).with_title(settings.render.title.as_str());
    let rendered = renderer.render(&request)?;

    fs::write(output, rendered.html.as_bytes()).map_err(|source| AppError::Output {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        target = "application::convert",
        op = "convert_to_html",
        result = "ok",
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        contains_code = rendered.contains_code,
        output = %output.display(),
        "HTML written"
    );

    Ok(())
}

fn read_input(input: &Path) -> Result<String, AppError> {
    fs::read_to_string(input).map_err(|source| AppError::Input {
        path: input.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;
    use crate::application::render::{RenderError, RenderOutput};
    use crate::application::typeset::TypesetError;
    use crate::config::{
        LogFormat, LoggingSettings, RenderSettings, TypesetSettings, WorkspaceSettings,
    };
    use tracing::level_filters::LevelFilter;

    fn settings(workspace_root: &Path) -> Settings {
        Settings {
            logging: LoggingSettings {
                level: LevelFilter::INFO,
                format: LogFormat::Compact,
            },
            render: RenderSettings {
                title: "Guide".to_string(),
                page_width: "210mm".to_string(),
                page_height: "297mm".to_string(),
                margin: "10mm".to_string(),
                accent: "#0969da".to_string(),
                text: "#171515".to_string(),
                text_dimmed: "#24292f".to_string(),
                page_background: "#ffffff".to_string(),
            },
            typeset: TypesetSettings {
                prince_path: PathBuf::from("prince"),
                pdf_profile: None,
                pdfinfo_path: PathBuf::from("pdfinfo"),
                pdfunite_path: PathBuf::from("pdfunite"),
            },
            workspace: WorkspaceSettings {
                root: Some(workspace_root.to_path_buf()),
                keep: false,
            },
        }
    }

    /// Emits the markdown verbatim so the typesetter can count headings.
    struct EchoRenderer;

    impl RenderService for EchoRenderer {
        fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
            if request.markdown.contains("BROKEN") {
                return Err(RenderError::Markdown {
                    message: "broken span".to_string(),
                });
            }
            Ok(RenderOutput {
                html: request.markdown.clone(),
                contains_code: false,
            })
        }
    }

    /// Two headings fit on a page; concatenation joins the inputs.
    #[derive(Default)]
    struct CountingTypesetter {
        concatenated: RefCell<usize>,
    }

    impl Typesetter for CountingTypesetter {
        fn html_to_pdf(&self, html: &Path, pdf: &Path) -> Result<(), TypesetError> {
            fs::copy(html, pdf).expect("copy");
            Ok(())
        }

        fn page_count(&self, pdf: &Path) -> Result<u32, TypesetError> {
            let content = fs::read_to_string(pdf).expect("pdf");
            let headings = content.lines().filter(|line| line.starts_with('#')).count() as u32;
            Ok(headings.div_ceil(2).max(1))
        }

        fn concatenate(&self, inputs: &[PathBuf], output: &Path) -> Result<(), TypesetError> {
            *self.concatenated.borrow_mut() += 1;
            let joined = inputs
                .iter()
                .map(|input| fs::read_to_string(input).expect("input"))
                .collect::<Vec<_>>()
                .join("\n---\n");
            fs::write(output, joined).expect("output");
            Ok(())
        }
    }

    #[test]
    fn pdf_pipeline_paginates_and_assembles() {
        let root = TempDir::new().expect("root");
        let input = root.path().join("guide.md");
        let output = root.path().join("guide.pdf");
        fs::write(&input, "# A\na\n# B\nb\n# C\nc\n# D\nd\n# E\ne").expect("input");
        let typesetter = CountingTypesetter::default();

        let report = convert_with(&input, &output, &settings(root.path()), &EchoRenderer, &typesetter)
            .expect("convert");

        assert_eq!(report.units, 5);
        assert_eq!(report.artifacts, 3);
        assert_eq!(report.output, output);
        assert_eq!(
            fs::read_to_string(&output).expect("output"),
            "# A\na\n# B\nb\n---\n# C\nc\n# D\nd\n---\n# E\ne"
        );
        assert_eq!(*typesetter.concatenated.borrow(), 1);

        let leftovers = fs::read_dir(root.path())
            .expect("root listing")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("markdown-to-pdf-"))
            .count();
        assert_eq!(leftovers, 0, "workspace was not removed");
    }

    #[test]
    fn render_failure_writes_no_output() {
        let root = TempDir::new().expect("root");
        let input = root.path().join("guide.md");
        let output = root.path().join("guide.pdf");
        fs::write(&input, "# A\na\n# BROKEN\nb").expect("input");

        let err = convert_with(
            &input,
            &output,
            &settings(root.path()),
            &EchoRenderer,
            &CountingTypesetter::default(),
        )
        .expect_err("render failure");

        assert!(matches!(err, AppError::Pagination(_)), "{err:?}");
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_reported_with_path() {
        let root = TempDir::new().expect("root");
        let input = root.path().join("absent.md");

        let err = convert_with(
            &input,
            &root.path().join("out.pdf"),
            &settings(root.path()),
            &EchoRenderer,
            &CountingTypesetter::default(),
        )
        .expect_err("missing input");

        match err {
            AppError::Input { path, .. } => assert_eq!(path, input),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn html_mode_writes_standalone_document() {
        let root = TempDir::new().expect("root");
        let input = root.path().join("guide.md");
        let output = root.path().join("guide.html");
        fs::write(&input, "# Title\n\n```rust\nfn main() {}\n```\n").expect("input");

        convert_to_html(&input, &output, &settings(root.path())).expect("html");

        let html = fs::read_to_string(&output).expect("html output");
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Guide</title>"));
        assert!(html.contains("syntax-lang-rust"));
    }
}
