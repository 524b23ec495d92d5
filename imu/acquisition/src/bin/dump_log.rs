use clap::Parser;
use imu_acquisition::LogReader;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Print a binary attitude log as CSV.
#[derive(Parser, Debug)]
#[command(name = "dump_log", version)]
struct Args {
    /// Log written by acquire_imu
    input: PathBuf,

    /// Print angles in degrees instead of radians
    #[arg(long)]
    degrees: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut reader = match LogReader::open(&args.input) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to open {}: {}", args.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("# start_unix_s={}", reader.wall_clock_secs());
    println!("elapsed_us,roll,pitch,yaw");
    let scale = if args.degrees { 180.0 / std::f32::consts::PI } else { 1.0 };
    loop {
        match reader.next_record() {
            Ok(Some(record)) => println!(
                "{},{:.6},{:.6},{:.6}",
                record.elapsed_us,
                record.euler.roll * scale,
                record.euler.pitch * scale,
                record.euler.yaw * scale,
            ),
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read record: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
