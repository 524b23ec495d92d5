use crate::acquisition::SessionConfig;
use crate::rate::{parse_frequency, OutputRate};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Example:    $ acquire_imu /dev/ttyUSB0 115200 output.bin 10

FREQUENCY is one of 200, 100, 50, 40, 25, 20, 10, 5 or 1 Hz.
Set RUST_LOG (e.g. RUST_LOG=debug) to change log verbosity.";

/// Record EKF Euler angles from an SBG IMU into a binary file.
#[derive(Parser, Debug, Clone)]
#[command(name = "acquire_imu", version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Serial port on which the IMU is plugged
    pub port: String,

    /// Baud rate of the serial connection, normally 115200
    pub baud: u32,

    /// Output file, created if missing and truncated otherwise
    pub output_file: PathBuf,

    /// Frequency in Hz at which data is collected
    #[arg(value_parser = parse_frequency)]
    pub frequency: OutputRate,
}

impl Cli {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.output_file.clone(), self.frequency)
    }
}

/// Parses the command line without exiting the process.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn accepts_four_positional_arguments() {
        let cli = parse_args(["acquire_imu", "/dev/ttyUSB0", "115200", "out.bin", "50"]).unwrap();
        assert_eq!(cli.port, "/dev/ttyUSB0");
        assert_eq!(cli.baud, 115200);
        assert_eq!(cli.frequency, OutputRate::Hz50);

        let config = cli.session_config();
        assert_eq!(config.output_file, PathBuf::from("out.bin"));
        assert_eq!(config.rate, OutputRate::Hz50);
    }

    #[test]
    fn rejects_unsupported_frequency() {
        let err =
            parse_args(["acquire_imu", "/dev/ttyUSB0", "115200", "out.bin", "7"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_wrong_argument_count() {
        assert!(parse_args(["acquire_imu", "/dev/ttyUSB0", "115200", "out.bin"]).is_err());
        assert!(parse_args(["acquire_imu", "a", "1", "b", "10", "extra"]).is_err());
    }

    #[test]
    fn usage_lists_arguments() {
        let text = usage();
        for name in ["PORT", "BAUD", "OUTPUT_FILE", "FREQUENCY"] {
            assert!(text.contains(name), "{} missing from usage", name);
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
