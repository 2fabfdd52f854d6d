//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::render::DocumentStyle;

pub use cli::{
    CliArgs, Command, HtmlArgs, HtmlOverrides, LoggingOverrides, PdfArgs, PdfOverrides,
    RenderOverrides, TypesetOverrides, WorkspaceOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "mdfolio";
const ENV_PREFIX: &str = "MDFOLIO";
const DEFAULT_PRINCE_PATH: &str = "prince";
const DEFAULT_PDF_PROFILE: &str = "PDF/UA-1";
const DEFAULT_PDFINFO_PATH: &str = "pdfinfo";
const DEFAULT_PDFUNITE_PATH: &str = "pdfunite";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
    pub typeset: TypesetSettings,
    pub workspace: WorkspaceSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub title: String,
    pub page_width: String,
    pub page_height: String,
    pub margin: String,
    pub accent: String,
    pub text: String,
    pub text_dimmed: String,
    pub page_background: String,
}

#[derive(Debug, Clone)]
pub struct TypesetSettings {
    pub prince_path: PathBuf,
    /// `None` when the profile was configured as an empty string.
    pub pdf_profile: Option<String>,
    pub pdfinfo_path: PathBuf,
    pub pdfunite_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct WorkspaceSettings {
    pub root: Option<PathBuf>,
    pub keep: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match &cli.command {
        Command::Pdf(args) => raw.apply_pdf_overrides(&args.overrides),
        Command::Html(args) => raw.apply_html_overrides(&args.overrides),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
    typeset: RawTypesetSettings,
    workspace: RawWorkspaceSettings,
}

impl RawSettings {
    fn apply_pdf_overrides(&mut self, overrides: &PdfOverrides) {
        self.apply_logging_overrides(&overrides.logging);
        self.apply_render_overrides(&overrides.render);
        self.apply_typeset_overrides(&overrides.typeset);
        self.apply_workspace_overrides(&overrides.workspace);
    }

    fn apply_html_overrides(&mut self, overrides: &HtmlOverrides) {
        self.apply_logging_overrides(&overrides.logging);
        self.apply_render_overrides(&overrides.render);
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(title) = overrides.title.as_ref() {
            self.render.title = Some(title.clone());
        }
        if let Some(width) = overrides.page_width.as_ref() {
            self.render.page_width = Some(width.clone());
        }
        if let Some(height) = overrides.page_height.as_ref() {
            self.render.page_height = Some(height.clone());
        }
        if let Some(margin) = overrides.margin.as_ref() {
            self.render.margin = Some(margin.clone());
        }
    }

    fn apply_typeset_overrides(&mut self, overrides: &TypesetOverrides) {
        if let Some(path) = overrides.prince_path.as_ref() {
            self.typeset.prince_path = Some(path.clone());
        }
        if let Some(profile) = overrides.pdf_profile.as_ref() {
            self.typeset.pdf_profile = Some(profile.clone());
        }
        if let Some(path) = overrides.pdfinfo_path.as_ref() {
            self.typeset.pdfinfo_path = Some(path.clone());
        }
        if let Some(path) = overrides.pdfunite_path.as_ref() {
            self.typeset.pdfunite_path = Some(path.clone());
        }
    }

    fn apply_workspace_overrides(&mut self, overrides: &WorkspaceOverrides) {
        if let Some(root) = overrides.workspace_root.as_ref() {
            self.workspace.root = Some(root.clone());
        }
        if overrides.keep_workspace {
            self.workspace.keep = Some(true);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            render,
            typeset,
            workspace,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let render = build_render_settings(render)?;
        let typeset = build_typeset_settings(typeset)?;
        let workspace = build_workspace_settings(workspace)?;

        Ok(Self {
            logging,
            render,
            typeset,
            workspace,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    Ok(RenderSettings {
        title: render.title.unwrap_or_default(),
        page_width: css_value(
            "render.page_width",
            render.page_width,
            DocumentStyle::DEFAULT_PAGE_WIDTH,
        )?,
        page_height: css_value(
            "render.page_height",
            render.page_height,
            DocumentStyle::DEFAULT_PAGE_HEIGHT,
        )?,
        margin: css_value(
            "render.margin",
            render.margin,
            DocumentStyle::DEFAULT_PAGE_MARGIN,
        )?,
        accent: css_value("render.accent", render.accent, DocumentStyle::DEFAULT_ACCENT)?,
        text: css_value("render.text", render.text, DocumentStyle::DEFAULT_TEXT)?,
        text_dimmed: css_value(
            "render.text_dimmed",
            render.text_dimmed,
            DocumentStyle::DEFAULT_TEXT_DIMMED,
        )?,
        page_background: css_value(
            "render.page_background",
            render.page_background,
            DocumentStyle::DEFAULT_PAGE_BACKGROUND,
        )?,
    })
}

fn build_typeset_settings(typeset: RawTypesetSettings) -> Result<TypesetSettings, LoadError> {
    let prince_path = tool_path("typeset.prince_path", typeset.prince_path, DEFAULT_PRINCE_PATH)?;
    let pdfinfo_path = tool_path(
        "typeset.pdfinfo_path",
        typeset.pdfinfo_path,
        DEFAULT_PDFINFO_PATH,
    )?;
    let pdfunite_path = tool_path(
        "typeset.pdfunite_path",
        typeset.pdfunite_path,
        DEFAULT_PDFUNITE_PATH,
    )?;

    let pdf_profile = match typeset.pdf_profile {
        Some(value) => {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        None => Some(DEFAULT_PDF_PROFILE.to_string()),
    };

    Ok(TypesetSettings {
        prince_path,
        pdf_profile,
        pdfinfo_path,
        pdfunite_path,
    })
}

fn build_workspace_settings(
    workspace: RawWorkspaceSettings,
) -> Result<WorkspaceSettings, LoadError> {
    let root = match workspace.root {
        Some(root) if root.as_os_str().is_empty() => {
            return Err(LoadError::invalid(
                "workspace.root",
                "path must not be empty",
            ));
        }
        other => other,
    };

    Ok(WorkspaceSettings {
        root,
        keep: workspace.keep.unwrap_or(false),
    })
}

fn tool_path(
    key: &'static str,
    value: Option<PathBuf>,
    default: &str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

/// Values are spliced into the generated stylesheet, so they must be a single CSS token list.
fn css_value(key: &'static str, value: Option<String>, default: &str) -> Result<String, LoadError> {
    let value = value.unwrap_or_else(|| default.to_string());
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LoadError::invalid(key, "value must not be empty"));
    }
    if trimmed.contains([';', '{', '}', '<', '>']) {
        return Err(LoadError::invalid(
            key,
            format!("`{trimmed}` is not a valid CSS value"),
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    title: Option<String>,
    page_width: Option<String>,
    page_height: Option<String>,
    margin: Option<String>,
    accent: Option<String>,
    text: Option<String>,
    text_dimmed: Option<String>,
    page_background: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTypesetSettings {
    prince_path: Option<PathBuf>,
    pdf_profile: Option<String>,
    pdfinfo_path: Option<PathBuf>,
    pdfunite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWorkspaceSettings {
    root: Option<PathBuf>,
    keep: Option<bool>,
}
