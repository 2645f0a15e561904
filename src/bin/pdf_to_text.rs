use clap::Parser;
use doctools::{
    logging, OutputFormatter, OutputMode, PdfToText, PdfToTextCli, UserFriendlyError,
};
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = PdfToTextCli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if cli.generate_config {
        return handle_generate_config(cli.config.as_deref());
    }

    let pdf_file = cli
        .pdf_file
        .as_deref()
        .expect("clap requires pdf_file unless --generate-config is given");

    // Backend selection happens here, before any file is touched.
    let converter = match PdfToText::from_cli(&cli) {
        Ok(converter) => converter,
        Err(e) => {
            print_startup_error(&e, OutputMode::from(&cli.output_format));
            return e.exit_code();
        }
    };

    match converter.convert(pdf_file, cli.output.as_deref()) {
        Ok(report) => {
            converter.output_formatter().print_conversion_report(&report);
            0
        }
        Err(e) => {
            tracing::debug!("conversion of {} failed: {:?}", pdf_file.display(), e);
            converter.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(config_path: Option<&Path>) -> i32 {
    let config_path = config_path.unwrap_or_else(|| Path::new("doctools.toml"));

    match doctools::generate_sample_config(config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path.display());
            println!("\nTo use this configuration:");
            println!("  pdf-to-text <pdf-file> --config {}", config_path.display());
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("{}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &doctools::DocToolsError, mode: OutputMode) {
    let formatter = OutputFormatter::new(mode, 0, false);
    formatter.print_user_friendly_error(error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");

        let exit_code = handle_generate_config(Some(&config_path));
        assert_eq!(exit_code, 0);

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("backends"));
    }

    #[test]
    fn test_generate_config_into_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("no/such/dir/doctools.toml");

        assert_eq!(handle_generate_config(Some(&config_path)), 1);
    }
}
