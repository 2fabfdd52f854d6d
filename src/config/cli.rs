use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the mdfolio binary.
#[derive(Debug, Parser)]
#[command(
    name = "mdfolio",
    version,
    about = "Convert Markdown into a PDF whose pages start at headings"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "MDFOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Paginate a Markdown document into a PDF.
    Pdf(PdfArgs),
    /// Render a Markdown document into a standalone HTML file.
    Html(HtmlArgs),
}

#[derive(Debug, Args, Clone)]
pub struct PdfArgs {
    #[command(flatten)]
    pub overrides: PdfOverrides,

    /// Markdown document to convert.
    #[arg(value_name = "INPUT", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Destination PDF file.
    #[arg(value_name = "OUTPUT", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct HtmlArgs {
    #[command(flatten)]
    pub overrides: HtmlOverrides,

    /// Markdown document to render.
    #[arg(value_name = "INPUT", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Destination HTML file.
    #[arg(value_name = "OUTPUT", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct PdfOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub render: RenderOverrides,

    #[command(flatten)]
    pub typeset: TypesetOverrides,

    #[command(flatten)]
    pub workspace: WorkspaceOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct HtmlOverrides {
    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(flatten)]
    pub render: RenderOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Override the document title.
    #[arg(long = "title", value_name = "TEXT")]
    pub title: Option<String>,

    /// Override the page width (CSS length).
    #[arg(long = "page-width", value_name = "LENGTH")]
    pub page_width: Option<String>,

    /// Override the page height (CSS length).
    #[arg(long = "page-height", value_name = "LENGTH")]
    pub page_height: Option<String>,

    /// Override the page margin (CSS length).
    #[arg(long = "page-margin", value_name = "LENGTH")]
    pub margin: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct TypesetOverrides {
    /// Override the Prince executable path.
    #[arg(long = "prince-path", value_name = "PATH")]
    pub prince_path: Option<PathBuf>,

    /// Override the PDF profile passed to Prince; an empty value disables it.
    #[arg(long = "pdf-profile", value_name = "PROFILE")]
    pub pdf_profile: Option<String>,

    /// Override the pdfinfo executable path.
    #[arg(long = "pdfinfo-path", value_name = "PATH")]
    pub pdfinfo_path: Option<PathBuf>,

    /// Override the pdfunite executable path.
    #[arg(long = "pdfunite-path", value_name = "PATH")]
    pub pdfunite_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct WorkspaceOverrides {
    /// Create the per-run workspace under this directory.
    #[arg(long = "workspace-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub workspace_root: Option<PathBuf>,

    /// Keep the workspace directory after the run.
    #[arg(long = "keep-workspace", action = clap::ArgAction::SetTrue)]
    pub keep_workspace: bool,
}
