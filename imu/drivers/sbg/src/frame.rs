use byteorder::{ByteOrder, LittleEndian};
use imu_traits::{EkfEulerData, EulerAngles, ImuError, LogData, LogFrame, MessageClass};

pub const SYNC_1: u8 = 0xFF;
pub const SYNC_2: u8 = 0x5A;
pub const ETX: u8 = 0x33;
pub const MAX_PAYLOAD_SIZE: usize = 4086;

// Log ids within the ECOM_0 class
pub const LOG_STATUS: u8 = 1;
pub const LOG_IMU_DATA: u8 = 3;
pub const LOG_EKF_EULER: u8 = 6;
pub const LOG_EKF_QUAT: u8 = 7;

// Command ids within the CMD_0 class
pub const CMD_ACK: u8 = 0;
pub const CMD_OUTPUT_CONF: u8 = 28;

const EKF_EULER_SIZE: usize = 32;

/// A frame that passed its CRC and end-of-frame checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub class: MessageClass,
    pub id: u8,
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Interprets the payload of a log frame.
    pub fn into_log(self) -> Result<LogFrame, ImuError> {
        let data = match (self.class, self.id) {
            (MessageClass::LogEcom0, LOG_EKF_EULER) => {
                LogData::EkfEuler(parse_ekf_euler(&self.payload)?)
            }
            _ => LogData::Raw(self.payload),
        };
        Ok(LogFrame {
            class: self.class,
            id: self.id,
            data,
        })
    }
}

fn parse_ekf_euler(payload: &[u8]) -> Result<EkfEulerData, ImuError> {
    if payload.len() < EKF_EULER_SIZE {
        return Err(ImuError::InvalidPacket(format!(
            "EKF euler payload is {} bytes, expected {}",
            payload.len(),
            EKF_EULER_SIZE
        )));
    }

    let angles = |offset: usize| {
        EulerAngles::new(
            LittleEndian::read_f32(&payload[offset..]),
            LittleEndian::read_f32(&payload[offset + 4..]),
            LittleEndian::read_f32(&payload[offset + 8..]),
        )
    };

    Ok(EkfEulerData {
        time_stamp: LittleEndian::read_u32(&payload[0..4]),
        euler: angles(4),
        euler_std_dev: angles(16),
        status: LittleEndian::read_u32(&payload[28..32]),
    })
}

/// CRC-16 with polynomial 0x8408 (LSB first) and a zero seed.
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &b in bytes {
        crc ^= b as u16;
        for _ in 0..8 {
            if (crc & 0x0001) != 0 {
                crc = (crc >> 1) ^ 0x8408;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

pub fn encode_frame(class: MessageClass, id: u8, payload: &[u8]) -> Result<Vec<u8>, ImuError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(ImuError::WriteError(format!(
            "payload of {} bytes exceeds the {} byte limit",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = Vec::with_capacity(payload.len() + 9);
    frame.push(SYNC_1);
    frame.push(SYNC_2);
    frame.push(id);
    frame.push(class.to_byte());
    frame.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    frame.extend_from_slice(payload);
    let crc = crc16(&frame[2..]);
    frame.extend_from_slice(&crc.to_be_bytes());
    frame.push(ETX);
    Ok(frame)
}

#[derive(Debug, PartialEq, Clone, Copy)]
enum FrameState {
    Idle,
    Sync,
    MsgId,
    Class,
    LengthLow,
    LengthHigh,
    Payload,
    Crc,
    Etx,
}

/// Byte-wise reassembly of frames split across arbitrary reads.
pub struct FrameParser {
    frame_state: FrameState,
    id: u8,
    class: u8,
    length: usize,
    payload: Vec<u8>,
    crc: [u8; 2],
    byte_num: usize,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        FrameParser {
            frame_state: FrameState::Idle,
            id: 0,
            class: 0,
            length: 0,
            payload: Vec::new(),
            crc: [0u8; 2],
            byte_num: 0,
        }
    }

    /// Feeds bytes in and returns every frame completed by them, in order.
    /// A corrupt frame shows up as an `Err` entry and parsing carries on.
    pub fn parse(&mut self, input_data: &[u8]) -> Vec<Result<RawFrame, ImuError>> {
        let mut frames = Vec::new();
        for &data in input_data {
            match self.frame_state {
                FrameState::Idle => {
                    if data == SYNC_1 {
                        self.frame_state = FrameState::Sync;
                    }
                }
                FrameState::Sync => match data {
                    SYNC_2 => self.frame_state = FrameState::MsgId,
                    SYNC_1 => {}
                    _ => self.reset(),
                },
                FrameState::MsgId => {
                    self.id = data;
                    self.frame_state = FrameState::Class;
                }
                FrameState::Class => {
                    self.class = data;
                    self.frame_state = FrameState::LengthLow;
                }
                FrameState::LengthLow => {
                    self.length = data as usize;
                    self.frame_state = FrameState::LengthHigh;
                }
                FrameState::LengthHigh => {
                    self.length |= (data as usize) << 8;
                    if self.length > MAX_PAYLOAD_SIZE {
                        frames.push(Err(ImuError::InvalidPacket(format!(
                            "declared payload length {} exceeds {}",
                            self.length, MAX_PAYLOAD_SIZE
                        ))));
                        self.reset();
                    } else if self.length == 0 {
                        self.frame_state = FrameState::Crc;
                    } else {
                        self.payload.reserve(self.length);
                        self.frame_state = FrameState::Payload;
                    }
                }
                FrameState::Payload => {
                    self.payload.push(data);
                    if self.payload.len() == self.length {
                        self.frame_state = FrameState::Crc;
                    }
                }
                FrameState::Crc => {
                    self.crc[self.byte_num] = data;
                    self.byte_num += 1;
                    if self.byte_num == 2 {
                        self.frame_state = FrameState::Etx;
                    }
                }
                FrameState::Etx => {
                    frames.push(self.finish(data));
                    self.reset();
                }
            }
        }
        frames
    }

    fn finish(&mut self, etx: u8) -> Result<RawFrame, ImuError> {
        if etx != ETX {
            return Err(ImuError::InvalidPacket(format!(
                "expected end of frame 0x{:02x}, got 0x{:02x}",
                ETX, etx
            )));
        }

        let mut covered = Vec::with_capacity(self.payload.len() + 4);
        covered.push(self.id);
        covered.push(self.class);
        covered.extend_from_slice(&(self.length as u16).to_le_bytes());
        covered.extend_from_slice(&self.payload);
        let expected = crc16(&covered);
        let received = u16::from_be_bytes(self.crc);
        if expected != received {
            return Err(ImuError::InvalidPacket(format!(
                "CRC mismatch on class 0x{:02x} id {}: computed 0x{:04x}, received 0x{:04x}",
                self.class, self.id, expected, received
            )));
        }

        Ok(RawFrame {
            class: MessageClass::from_byte(self.class),
            id: self.id,
            payload: std::mem::take(&mut self.payload),
        })
    }

    fn reset(&mut self) {
        self.frame_state = FrameState::Idle;
        self.length = 0;
        self.payload.clear();
        self.byte_num = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euler_payload(time_stamp: u32, euler: [f32; 3]) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&time_stamp.to_le_bytes());
        for v in euler {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        for v in [0.01f32, 0.02, 0.03] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload.extend_from_slice(&0x37u32.to_le_bytes());
        payload
    }

    #[test]
    fn crc_matches_reference_check_value() {
        assert_eq!(crc16(b"123456789"), 0x2189);
    }

    #[test]
    fn parses_frame_split_across_reads() {
        let payload = euler_payload(1000, [0.1, 0.2, 0.3]);
        let bytes = encode_frame(MessageClass::LogEcom0, LOG_EKF_EULER, &payload).unwrap();
        let mut parser = FrameParser::new();

        let (head, tail) = bytes.split_at(7);
        assert!(parser.parse(head).is_empty());
        let frames = parser.parse(tail);
        assert_eq!(frames.len(), 1);

        let log = frames.into_iter().next().unwrap().unwrap().into_log().unwrap();
        match log.data {
            LogData::EkfEuler(data) => {
                assert_eq!(data.time_stamp, 1000);
                assert_eq!(data.euler, EulerAngles::new(0.1, 0.2, 0.3));
                assert_eq!(data.status, 0x37);
            }
            other => panic!("unexpected log data {:?}", other),
        }
    }

    #[test]
    fn skips_garbage_between_frames() {
        let a = encode_frame(MessageClass::LogEcom0, LOG_STATUS, &[1, 2, 3]).unwrap();
        let b = encode_frame(MessageClass::Cmd0, CMD_ACK, &[CMD_OUTPUT_CONF, 0x10, 0, 0]).unwrap();
        let mut stream = vec![0x00, 0x12, SYNC_1, 0x00];
        stream.extend_from_slice(&a);
        stream.extend_from_slice(&[0xAB, 0xCD]);
        stream.extend_from_slice(&b);

        let frames: Vec<RawFrame> = FrameParser::new()
            .parse(&stream)
            .into_iter()
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].id, LOG_STATUS);
        assert_eq!(frames[0].payload, vec![1, 2, 3]);
        assert_eq!(frames[1].class, MessageClass::Cmd0);
    }

    #[test]
    fn corrupt_frame_reports_error_and_parser_recovers() {
        let class = MessageClass::LogEcom0;
        let mut bad = encode_frame(class, LOG_EKF_EULER, &euler_payload(1, [0.0; 3])).unwrap();
        bad[10] ^= 0xFF;
        let good = encode_frame(class, LOG_EKF_EULER, &euler_payload(2, [1.0; 3])).unwrap();

        let mut parser = FrameParser::new();
        let mut stream = bad;
        stream.extend_from_slice(&good);
        let frames = parser.parse(&stream);

        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Err(ImuError::InvalidPacket(_))));
        assert!(frames[1].is_ok());
    }

    #[test]
    fn rejects_oversized_length() {
        let stream = [SYNC_1, SYNC_2, LOG_STATUS, 0x00, 0xFF, 0xFF];
        let frames = FrameParser::new().parse(&stream);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_err());
    }

    #[test]
    fn short_euler_payload_is_invalid() {
        let frame = RawFrame {
            class: MessageClass::LogEcom0,
            id: LOG_EKF_EULER,
            payload: vec![0; 12],
        };
        assert!(frame.into_log().is_err());
    }
}
