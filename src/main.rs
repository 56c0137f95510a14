use itemshot::config::Config;
use itemshot::data::CsvSource;
use itemshot::logs::Reporter;
use itemshot::pipeline::Pipeline;
use itemshot::Result;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Composite product photos for every row of the job table.
///
/// A plain invocation reads `items.csv` next to the executable and writes
/// finished images into the `output` subdirectory; `itemshot.toml` in the
/// same place can adjust columns, directories, and the font.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Working root; defaults to the executable's directory.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_exe()?
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let config = Config::load(&base_dir)?;
    let reporter = Reporter::new(Some(&base_dir.join(&config.log_file)))?;
    let source = CsvSource::open(base_dir.join(&config.job_table))?;

    let pipeline = Pipeline::new(&base_dir, config, source)?;
    let report = pipeline.run(&reporter)?;
    if !report.failed.is_empty() {
        reporter.warn(format!(
            "{} of {} rows failed",
            report.failed.len(),
            report.failed.len() + report.completed.len()
        ));
    }
    Ok(())
}
