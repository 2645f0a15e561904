use clap::Parser;
use doctools::{
    logging, AnalyzeExcelCli, ExcelStructureAnalyzer, OutputFormatter, OutputMode,
    UserFriendlyError,
};
use std::path::Path;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = AnalyzeExcelCli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if cli.generate_config {
        return handle_generate_config(cli.config.as_deref());
    }

    let workbook_path = cli
        .workbook
        .as_deref()
        .expect("clap requires workbook unless --generate-config is given");

    let analyzer = match ExcelStructureAnalyzer::from_cli(&cli) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            let formatter = OutputFormatter::new(OutputMode::from(&cli.output_format), 0, false);
            formatter.print_user_friendly_error(&e);
            return e.exit_code();
        }
    };

    let result = analyzer.analyze_file(workbook_path).and_then(|analysis| {
        let summary = analyzer.report(&analysis)?;
        if let Some(ref summary_path) = cli.summary_out {
            analyzer.write_summary(&summary, summary_path)?;
        }
        Ok(summary)
    });

    match result {
        Ok(summary) => {
            tracing::info!(
                "analyzed {} sheets of {}",
                summary.total_sheets,
                workbook_path.display()
            );
            0
        }
        Err(e) => {
            analyzer.handle_error(&e);
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
            println!("  analyze-excel <workbook> --config {}", config_path.display());
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
