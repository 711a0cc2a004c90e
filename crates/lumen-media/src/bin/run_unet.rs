//! UNet restoration pipeline entry point.
//!
//! Usage: `run-unet <input_video> <output_video>`
//!
//! Exit codes: 0 success, 2 setup/weight-load failure, 1 processing failure.
//! Stdout carries human-readable diagnostics plus the one machine-parseable
//! `PROCESSED_COUNT=<n>` line.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use lumen_media::{PipelineConfig, PipelineDriver};
use lumen_models::EnhanceMethod;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input_video_path> <output_video_path>", args[0]);
        return ExitCode::from(1);
    }

    let config = PipelineConfig::from_env();
    let driver = PipelineDriver::new(config, EnhanceMethod::Unet);

    let start = Instant::now();
    match driver.run(Path::new(&args[1]), Path::new(&args[2])) {
        Ok(summary) => {
            println!("UNet processing complete.");
            println!(
                "Processed frames: {}/{}",
                summary.frames_processed, summary.frames_seen
            );
            println!(
                "Total time: {:.2} sec | Avg per frame: {:.4} sec",
                start.elapsed().as_secs_f64(),
                summary.avg_time_per_frame_secs()
            );
            println!("Output saved to: {}", summary.output_path.display());
            println!("{}", summary.summary_line());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
