use clap::error::ErrorKind;
use imu_acquisition::cli::{parse_args, usage};
use imu_acquisition::{run_session, AcquisitionError, ShutdownFlag, SystemClock};
use sbg::{EcomDecoder, SerialTransport};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let reason = e.to_string();
            let reason = reason.lines().next().unwrap_or("invalid arguments");
            eprintln!("{}\n\n{}", reason, usage());
            return ExitCode::from(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let shutdown = match ShutdownFlag::install() {
        Ok(flag) => flag,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };

    let config = cli.session_config();
    let result = run_session(&config, SystemClock, &shutdown, || {
        let transport =
            SerialTransport::open(&cli.port, cli.baud).map_err(AcquisitionError::Transport)?;
        EcomDecoder::new(transport).map_err(AcquisitionError::Decoder)
    });

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}
