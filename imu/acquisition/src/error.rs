use imu_traits::ImuError;
use std::fmt;
use std::io;

/// Failures that abort a capture before the loop starts. All map to exit status 1.
#[derive(Debug)]
pub enum AcquisitionError {
    /// The serial port could not be opened
    Transport(ImuError),
    /// The protocol decoder could not be initialized
    Decoder(ImuError),
    /// The sensor did not accept the output rate
    Configuration(ImuError),
    /// The output file could not be created or written
    Io(io::Error),
    /// Signal handlers could not be registered
    Signal(String),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::Transport(e) => write!(f, "Error while opening serial port: {}", e),
            AcquisitionError::Decoder(e) => write!(f, "Error initialising protocol decoder: {}", e),
            AcquisitionError::Configuration(e) => write!(f, "Error while configuring logs: {}", e),
            AcquisitionError::Io(e) => write!(f, "Error on output file: {}", e),
            AcquisitionError::Signal(s) => write!(f, "Error installing signal handlers: {}", s),
        }
    }
}

impl std::error::Error for AcquisitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AcquisitionError::Transport(e)
            | AcquisitionError::Decoder(e)
            | AcquisitionError::Configuration(e) => Some(e),
            AcquisitionError::Io(e) => Some(e),
            AcquisitionError::Signal(_) => None,
        }
    }
}

impl From<io::Error> for AcquisitionError {
    fn from(error: io::Error) -> Self {
        AcquisitionError::Io(error)
    }
}
