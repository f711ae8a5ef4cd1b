use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use log::info;

use traffic_survey::report::{print_route_list, print_route_summary};
use traffic_survey::{
    logger, CsvReportWriter, DashboardConfig, NoCache, ReportSink, SelectionContext, SheetId,
    SurveyPipeline, SurveySources,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Travel-time survey speed profiles", long_about = None)]
struct Cli {
    /// JSON config file; defaults apply when omitted
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory holding the survey CSV exports
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the surveyed routes
    Routes,
    /// Build the full report for one route
    Report {
        /// Sheet name of the route, e.g. "Grafik TJ-1"
        #[arg(long)]
        sheet: String,

        /// Where to write the CSV outputs
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
    },
    /// Export the speed table of every route
    Speeds {
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::setup();

    let mut config = DashboardConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let start = Instant::now();
    let mut pipeline = SurveyPipeline::new(SurveySources::from_config(&config), NoCache);
    let dataset = pipeline
        .dataset()
        .with_context(|| format!("processing survey data in {}", config.data_dir.display()))?;
    info!("Processed {} speed rows in {:.2?}", dataset.speed_table.len(), start.elapsed());

    match cli.command {
        Command::Routes => print_route_list(&dataset.routes()),
        Command::Report { sheet, output } => {
            let selection = SelectionContext::new(SheetId::new(sheet));
            let report = dataset
                .route_report(&selection, &config.speed_bands)
                .with_context(|| format!("building report for {}", selection.sheet))?;
            print_route_summary(&report);

            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            let mut writer = CsvReportWriter::new(&output_dir)?;
            writer.route_report(&report)?;
            println!("\n📁 {} files written to {}", writer.written().len(), output_dir.display());
        }
        Command::Speeds { output } => {
            let output_dir = output.unwrap_or_else(|| config.output_dir.clone());
            let mut writer = CsvReportWriter::new(&output_dir)?;
            writer.speed_table(&dataset.speed_table)?;
            println!(
                "\n📁 Speed table ({} rows) written to {}",
                dataset.speed_table.len(),
                output_dir.display()
            );
        }
    }

    Ok(())
}
