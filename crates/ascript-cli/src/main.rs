use ascript_cli::run_analysis;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ascript")]
#[command(about = "AngelScript parser and semantic analyzer", long_about = None)]
struct Cli {
    /// Input file or directory to analyze
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Report every file, not just the ones with findings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let report = run_analysis(&cli.input, cli.verbose).map_err(|e| anyhow::anyhow!(e))?;

    for line in &report.lines {
        println!("{line}");
    }
    println!(
        "Analyzed {} file(s): {} error(s), {} warning(s)",
        report.file_count, report.error_count, report.warning_count
    );

    if report.error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
