pub mod decoder;
pub mod frame;
pub mod port;

pub use decoder::{error_code_to_str, EcomDecoder};
pub use frame::*;
pub use imu_traits::{
    EkfEulerData, EulerAngles, FrameHandler, ImuError, LogData, LogFrame, MessageClass, OutputMode,
    PollOutcome, ProtocolDecoder, Transport,
};
pub use port::SerialTransport;

/// Opens the serial link and initializes a protocol handle on it.
pub fn connect(port_name: &str, baud_rate: u32) -> Result<EcomDecoder<SerialTransport>, ImuError> {
    let transport = SerialTransport::open(port_name, baud_rate)?;
    EcomDecoder::new(transport)
}
