use super::*;

#[test]
fn defaults_match_a4_pages_and_poppler_tools() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.render.title, "");
    assert_eq!(settings.render.page_width, "210mm");
    assert_eq!(settings.render.page_height, "297mm");
    assert_eq!(settings.render.margin, "10mm");
    assert_eq!(settings.typeset.prince_path, PathBuf::from("prince"));
    assert_eq!(settings.typeset.pdf_profile.as_deref(), Some("PDF/UA-1"));
    assert_eq!(settings.typeset.pdfinfo_path, PathBuf::from("pdfinfo"));
    assert_eq!(settings.typeset.pdfunite_path, PathBuf::from("pdfunite"));
    assert!(settings.workspace.root.is_none());
    assert!(!settings.workspace.keep);
}

#[test]
fn default_render_settings_build_the_default_document_style() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");
    assert_eq!(DocumentStyle::from(&settings.render), DocumentStyle::default());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.render.page_height = Some("148mm".to_string());

    let overrides = PdfOverrides {
        logging: LoggingOverrides {
            log_level: Some("debug".to_string()),
            ..Default::default()
        },
        render: RenderOverrides {
            page_height: Some("100mm".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_pdf_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.render.page_height, "100mm");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = HtmlOverrides {
        logging: LoggingOverrides {
            log_json: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_html_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn empty_pdf_profile_disables_flag() {
    let mut raw = RawSettings::default();
    raw.typeset.pdf_profile = Some("  ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.typeset.pdf_profile.is_none());
}

#[test]
fn invalid_values_name_the_offending_key() {
    let mut raw = RawSettings::default();
    raw.typeset.pdfinfo_path = Some(PathBuf::new());
    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "typeset.pdfinfo_path"),
        other => panic!("unexpected result: {other:?}"),
    }

    let mut raw = RawSettings::default();
    raw.render.margin = Some("1cm; color: red".to_string());
    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "render.margin"),
        other => panic!("unexpected result: {other:?}"),
    }

    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "logging.level"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn keep_workspace_flag_only_enables() {
    let mut raw = RawSettings::default();
    raw.workspace.keep = Some(true);
    raw.apply_workspace_overrides(&WorkspaceOverrides::default());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.workspace.keep);
}

#[test]
fn parse_pdf_arguments() {
    let args = CliArgs::parse_from([
        "mdfolio",
        "pdf",
        "--prince-path",
        "/opt/prince/bin/prince",
        "--pdf-profile",
        "",
        "--keep-workspace",
        "guide.md",
        "guide.pdf",
    ]);

    match args.command {
        Command::Pdf(pdf) => {
            assert_eq!(pdf.input, PathBuf::from("guide.md"));
            assert_eq!(pdf.output, PathBuf::from("guide.pdf"));
            assert_eq!(
                pdf.overrides.typeset.prince_path,
                Some(PathBuf::from("/opt/prince/bin/prince"))
            );
            assert_eq!(pdf.overrides.typeset.pdf_profile.as_deref(), Some(""));
            assert!(pdf.overrides.workspace.keep_workspace);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_html_arguments() {
    let args = CliArgs::parse_from([
        "mdfolio",
        "html",
        "--title",
        "Guide",
        "--log-json",
        "true",
        "guide.md",
        "guide.html",
    ]);

    match args.command {
        Command::Html(html) => {
            assert_eq!(html.input, PathBuf::from("guide.md"));
            assert_eq!(html.output, PathBuf::from("guide.html"));
            assert_eq!(html.overrides.render.title.as_deref(), Some("Guide"));
            assert_eq!(html.overrides.logging.log_json, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn subcommand_is_required() {
    assert!(CliArgs::try_parse_from(["mdfolio"]).is_err());
}
