use std::error::Error as StdError;
use std::fmt;

// --- Basic Types ---
/// Orientation as roll, pitch and yaw, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl EulerAngles {
    pub fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        EulerAngles { roll, pitch, yaw }
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.roll, self.pitch, self.yaw]
    }
}

impl From<[f32; 3]> for EulerAngles {
    fn from(v: [f32; 3]) -> Self {
        EulerAngles::new(v[0], v[1], v[2])
    }
}

impl fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EulerAngles(roll={}, pitch={}, yaw={})",
            self.roll, self.pitch, self.yaw
        )
    }
}

// --- Decoded frames ---
/// First level of the two-level message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    LogEcom0,
    LogEcom1,
    Cmd0,
    Other(u8),
}

impl MessageClass {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => MessageClass::LogEcom0,
            0x01 => MessageClass::LogEcom1,
            0x10 => MessageClass::Cmd0,
            other => MessageClass::Other(other),
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            MessageClass::LogEcom0 => 0x00,
            MessageClass::LogEcom1 => 0x01,
            MessageClass::Cmd0 => 0x10,
            MessageClass::Other(byte) => *byte,
        }
    }

    pub fn is_log(&self) -> bool {
        !matches!(self, MessageClass::Cmd0)
    }
}

/// Output of the Kalman filter as Euler angles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EkfEulerData {
    /// Device time in microseconds
    pub time_stamp: u32,
    pub euler: EulerAngles,
    /// 1-sigma standard deviation of each angle (rad)
    pub euler_std_dev: EulerAngles,
    pub status: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogData {
    EkfEuler(EkfEulerData),
    /// Payload of a log type this crate does not decode
    Raw(Vec<u8>),
}

/// One decoded log message. Only valid for the duration of a handler call.
#[derive(Debug, Clone, PartialEq)]
pub struct LogFrame {
    pub class: MessageClass,
    pub id: u8,
    pub data: LogData,
}

/// Decimation of the sensor main loop applied to one log type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    MainLoop,
    Div2,
    Div4,
    Div5,
    Div8,
    Div10,
    Div20,
    Div40,
    Div200,
}

impl OutputMode {
    pub fn to_wire(&self) -> u16 {
        match self {
            OutputMode::MainLoop => 1,
            OutputMode::Div2 => 2,
            OutputMode::Div4 => 4,
            OutputMode::Div5 => 5,
            OutputMode::Div8 => 8,
            OutputMode::Div10 => 10,
            OutputMode::Div20 => 20,
            OutputMode::Div40 => 40,
            OutputMode::Div200 => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Bytes were consumed; any complete frames were dispatched.
    Processed,
    /// Nothing was pending on the transport.
    NotReady,
}

// --- Standard Error Type ---
#[derive(Debug)]
pub enum ImuError {
    /// Error originating from the underlying device communication (Serial)
    DeviceError(String),
    /// Error reading data from the device
    ReadError(String),
    /// Error writing commands to the device
    WriteError(String),
    /// The device rejected or never acknowledged a configuration command
    ConfigurationError(String),
    /// A frame failed its integrity checks
    InvalidPacket(String),
}

impl fmt::Display for ImuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImuError::DeviceError(s) => write!(f, "Device error: {}", s),
            ImuError::ReadError(s) => write!(f, "Read error: {}", s),
            ImuError::WriteError(s) => write!(f, "Write error: {}", s),
            ImuError::ConfigurationError(s) => write!(f, "Configuration error: {}", s),
            ImuError::InvalidPacket(s) => write!(f, "Invalid packet: {}", s),
        }
    }
}

impl StdError for ImuError {}

impl From<serialport::Error> for ImuError {
    fn from(error: serialport::Error) -> Self {
        ImuError::DeviceError(error.to_string())
    }
}

impl From<std::io::Error> for ImuError {
    fn from(error: std::io::Error) -> Self {
        ImuError::WriteError(error.to_string())
    }
}

// --- Seams ---
/// Byte-level link to the sensor.
pub trait Transport {
    /// Reads whatever is available. `Ok(0)` means nothing arrived in time.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ImuError>;

    fn write_all(&mut self, data: &[u8]) -> Result<(), ImuError>;

    fn close(self) -> Result<(), ImuError>
    where
        Self: Sized;
}

/// Receives each decoded log frame, synchronously, from inside `ProtocolDecoder::poll`.
pub trait FrameHandler {
    fn on_frame(&mut self, frame: &LogFrame);
}

impl<F: FnMut(&LogFrame)> FrameHandler for F {
    fn on_frame(&mut self, frame: &LogFrame) {
        self(frame)
    }
}

pub trait ProtocolDecoder {
    type Transport: Transport;

    /// Blocks until the sensor acknowledges the new output mode for one log type.
    fn configure_output(
        &mut self,
        class: MessageClass,
        id: u8,
        mode: OutputMode,
    ) -> Result<(), ImuError>;

    /// Drains available bytes once, handing every decoded log frame to `handler`
    /// before returning.
    fn poll(&mut self, handler: &mut dyn FrameHandler) -> Result<PollOutcome, ImuError>;

    /// Releases the decoder and gives back the transport so it can be closed last.
    fn close(self) -> Result<Self::Transport, ImuError>
    where
        Self: Sized;
}
