use crate::frame::{encode_frame, FrameParser, RawFrame, CMD_ACK, CMD_OUTPUT_CONF};
use byteorder::{ByteOrder, LittleEndian};
use imu_traits::{
    FrameHandler, ImuError, MessageClass, OutputMode, PollOutcome, ProtocolDecoder, Transport,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_NUM_TRIES: u32 = 3;
const READ_BUFFER_SIZE: usize = 1024;

// Logs are routed to the main serial interface of the sensor.
const OUTPUT_PORT_A: u8 = 0;

/// Device error code carried by an acknowledgement.
pub fn error_code_to_str(code: u16) -> &'static str {
    match code {
        0 => "SBG_NO_ERROR",
        1 => "SBG_ERROR",
        2 => "SBG_NULL_POINTER",
        3 => "SBG_INVALID_CRC",
        4 => "SBG_INVALID_FRAME",
        5 => "SBG_TIME_OUT",
        6 => "SBG_WRITE_ERROR",
        7 => "SBG_READ_ERROR",
        8 => "SBG_BUFFER_OVERFLOW",
        9 => "SBG_INVALID_PARAMETER",
        10 => "SBG_NOT_READY",
        11 => "SBG_MALLOC_FAILED",
        14 => "SBG_NOT_CONTINUOUS_FRAME",
        15 => "SBG_INCOMPATIBLE_HARDWARE",
        16 => "SBG_INVALID_VERSION",
        _ => "SBG_UNKNOWN_ERROR",
    }
}

/// sbgECom protocol handle over any byte transport.
pub struct EcomDecoder<T: Transport> {
    transport: T,
    frame_parser: FrameParser,
    command_timeout: Duration,
    num_tries: u32,
}

impl<T: Transport> EcomDecoder<T> {
    pub fn new(transport: T) -> Result<Self, ImuError> {
        let mut decoder = EcomDecoder {
            transport,
            frame_parser: FrameParser::new(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            num_tries: DEFAULT_NUM_TRIES,
        };
        decoder.clear()?;
        Ok(decoder)
    }

    pub fn with_command_timeout(mut self, timeout: Duration, num_tries: u32) -> Self {
        self.command_timeout = timeout;
        self.num_tries = num_tries.max(1);
        self
    }

    // Drop whatever was buffered before we started listening.
    fn clear(&mut self) -> Result<(), ImuError> {
        let mut buffer = [0u8; 64];
        for _ in 0..4 {
            let bytes_read = self
                .transport
                .read(&mut buffer)
                .map_err(|e| ImuError::DeviceError(format!("decoder init failed: {}", e)))?;
            if bytes_read == 0 {
                break;
            }
            debug!("Discarded {} stale bytes", bytes_read);
        }
        Ok(())
    }

    fn send(&mut self, class: MessageClass, id: u8, payload: &[u8]) -> Result<(), ImuError> {
        let frame = encode_frame(class, id, payload)?;
        self.transport.write_all(&frame)
    }

    /// Waits for the acknowledgement of `(class, id)` and returns its error code,
    /// or `None` on timeout.
    fn wait_ack(&mut self, class: MessageClass, id: u8) -> Result<Option<u16>, ImuError> {
        let deadline = Instant::now() + self.command_timeout;
        let mut buffer = [0u8; READ_BUFFER_SIZE];

        while Instant::now() < deadline {
            let n = self.transport.read(&mut buffer)?;
            if n == 0 {
                std::thread::sleep(Duration::from_millis(1));
                continue;
            }
            for result in self.frame_parser.parse(&buffer[..n]) {
                match result {
                    Ok(RawFrame {
                        class: MessageClass::Cmd0,
                        id: CMD_ACK,
                        payload,
                    }) if payload.len() >= 4
                        && payload[0] == id
                        && payload[1] == class.to_byte() =>
                    {
                        return Ok(Some(LittleEndian::read_u16(&payload[2..4])));
                    }
                    Ok(frame) => debug!(
                        "Dropped frame class {:?} id {} while awaiting ack",
                        frame.class, frame.id
                    ),
                    Err(e) => debug!("Dropped corrupt frame while awaiting ack: {}", e),
                }
            }
        }
        Ok(None)
    }
}

impl<T: Transport> ProtocolDecoder for EcomDecoder<T> {
    type Transport = T;

    fn configure_output(
        &mut self,
        class: MessageClass,
        id: u8,
        mode: OutputMode,
    ) -> Result<(), ImuError> {
        let mut payload = vec![OUTPUT_PORT_A, id, class.to_byte(), 0, 0];
        LittleEndian::write_u16(&mut payload[3..5], mode.to_wire());

        for attempt in 1..=self.num_tries {
            self.send(MessageClass::Cmd0, CMD_OUTPUT_CONF, &payload)?;
            match self.wait_ack(MessageClass::Cmd0, CMD_OUTPUT_CONF)? {
                Some(0) => {
                    debug!("Output of class {:?} id {} set to {:?}", class, id, mode);
                    return Ok(());
                }
                Some(code) => {
                    return Err(ImuError::ConfigurationError(format!(
                        "device rejected output configuration: {}",
                        error_code_to_str(code)
                    )));
                }
                None => warn!(
                    "No acknowledgement for output configuration (attempt {}/{})",
                    attempt, self.num_tries
                ),
            }
        }

        Err(ImuError::ConfigurationError(format!(
            "{}: no acknowledgement after {} attempts",
            error_code_to_str(5),
            self.num_tries
        )))
    }

    fn poll(&mut self, handler: &mut dyn FrameHandler) -> Result<PollOutcome, ImuError> {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let n = self.transport.read(&mut buffer)?;
        if n == 0 {
            return Ok(PollOutcome::NotReady);
        }

        let mut first_error = None;
        for result in self.frame_parser.parse(&buffer[..n]) {
            match result.and_then(|frame| {
                if frame.class.is_log() {
                    frame.into_log().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(log)) => handler.on_frame(&log),
                Ok(None) => {}
                Err(e) => match first_error {
                    None => first_error = Some(e),
                    Some(_) => debug!("Additional decode error in the same read: {}", e),
                },
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(PollOutcome::Processed),
        }
    }

    fn close(self) -> Result<T, ImuError> {
        debug!("Closing sbgECom decoder");
        Ok(self.transport)
    }
}
