use std::process;

use mdfolio::{
    application::{
        convert::{convert_to_html, convert_to_pdf},
        error::{AppError, error_chain},
    },
    config,
    infra::telemetry,
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error_chain(error).join(": caused by: ");
    if dispatcher::has_been_set() {
        error!(code = error.code(), error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(code = error.code(), error = %chain, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    match cli_args.command {
        config::Command::Pdf(args) => {
            let report = convert_to_pdf(&args.input, &args.output, &settings)?;
            info!(
                target = "mdfolio::pdf",
                units = report.units,
                artifacts = report.artifacts,
                output = %report.output.display(),
                "PDF written"
            );
        }
        config::Command::Html(args) => {
            convert_to_html(&args.input, &args.output, &settings)?;
            info!(
                target = "mdfolio::html",
                output = %args.output.display(),
                "HTML written"
            );
        }
    }

    Ok(())
}
