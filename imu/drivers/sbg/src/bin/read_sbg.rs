use clap::Parser;
use sbg::{
    LogData, LogFrame, MessageClass, OutputMode, PollOutcome, ProtocolDecoder, LOG_EKF_EULER,
};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Print EKF Euler angles from an SBG sensor.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "/dev/ttyUSB0")]
    port: String,
    #[arg(long, default_value_t = 115200)]
    baud: u32,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut decoder = match sbg::connect(&args.port, args.baud) {
        Ok(decoder) => decoder,
        Err(e) => {
            error!("Failed to connect to {}: {}", args.port, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) =
        decoder.configure_output(MessageClass::LogEcom0, LOG_EKF_EULER, OutputMode::Div20)
    {
        error!("Failed to set output rate: {}", e);
        return ExitCode::FAILURE;
    }

    let mut print = |frame: &LogFrame| {
        if let LogData::EkfEuler(data) = &frame.data {
            println!(
                "t: {: >10} roll: {: >10.3} pitch: {: >10.3} yaw: {: >10.3}",
                data.time_stamp,
                data.euler.roll.to_degrees(),
                data.euler.pitch.to_degrees(),
                data.euler.yaw.to_degrees(),
            );
        }
    };

    loop {
        match decoder.poll(&mut print) {
            Ok(PollOutcome::NotReady) => thread::sleep(Duration::from_millis(1)),
            Ok(PollOutcome::Processed) => {}
            Err(e) => warn!("Error reading from IMU: {}", e),
        }
    }
}
