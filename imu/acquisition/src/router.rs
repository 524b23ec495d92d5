use crate::time_ref::{Clock, TimeReference};
use crate::writer::RecordWriter;
use imu_traits::{FrameHandler, LogData, LogFrame, MessageClass};
use sbg::LOG_EKF_EULER;
use std::io::Write;
use tracing::{trace, warn};

/// Turns EKF Euler frames into timestamped records; every other frame is ignored.
pub struct FrameRouter<W: Write, C: Clock> {
    time_ref: TimeReference,
    writer: RecordWriter<W>,
    clock: C,
    class: MessageClass,
    id: u8,
    write_errors: u64,
}

impl<W: Write, C: Clock> FrameRouter<W, C> {
    pub fn new(time_ref: TimeReference, writer: RecordWriter<W>, clock: C) -> Self {
        FrameRouter {
            time_ref,
            writer,
            clock,
            class: MessageClass::LogEcom0,
            id: LOG_EKF_EULER,
            write_errors: 0,
        }
    }

    /// The (class, id) pair that produces records.
    pub fn log_type(&self) -> (MessageClass, u8) {
        (self.class, self.id)
    }

    pub fn records_written(&self) -> u64 {
        self.writer.records_written()
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn into_writer(self) -> RecordWriter<W> {
        self.writer
    }
}

impl<W: Write, C: Clock> FrameHandler for FrameRouter<W, C> {
    fn on_frame(&mut self, frame: &LogFrame) {
        if frame.class != self.class || frame.id != self.id {
            return;
        }
        let euler = match &frame.data {
            LogData::EkfEuler(data) => data.euler,
            LogData::Raw(_) => return,
        };

        let elapsed_us = self.time_ref.elapsed_micros(self.clock.now());
        match self.writer.append_record(elapsed_us, &euler) {
            Ok(()) => trace!("Record at {} us: {}", elapsed_us, euler),
            Err(e) => {
                self.write_errors += 1;
                warn!("Failed to write record at {} us: {}", elapsed_us, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_ref::SystemClock;
    use imu_traits::{EkfEulerData, EulerAngles};
    use std::io;
    use std::time::Instant;

    fn euler_frame(class: MessageClass, id: u8) -> LogFrame {
        LogFrame {
            class,
            id,
            data: LogData::EkfEuler(EkfEulerData {
                euler: EulerAngles::new(0.5, 0.25, 0.125),
                ..Default::default()
            }),
        }
    }

    fn router() -> FrameRouter<Vec<u8>, SystemClock> {
        let mut writer = RecordWriter::new(Vec::new());
        writer.write_header(0).unwrap();
        FrameRouter::new(TimeReference::new(0, Instant::now()), writer, SystemClock)
    }

    #[test]
    fn matching_frame_appends_record() {
        let mut router = router();
        router.on_frame(&euler_frame(MessageClass::LogEcom0, LOG_EKF_EULER));
        assert_eq!(router.records_written(), 1);
        assert_eq!(router.into_writer().close().unwrap().len(), 28);
    }

    #[test]
    fn other_frames_produce_no_write() {
        let mut router = router();
        router.on_frame(&euler_frame(MessageClass::LogEcom1, LOG_EKF_EULER));
        router.on_frame(&euler_frame(MessageClass::LogEcom0, sbg::LOG_EKF_QUAT));
        router.on_frame(&LogFrame {
            class: MessageClass::LogEcom0,
            id: LOG_EKF_EULER,
            data: LogData::Raw(vec![1, 2, 3]),
        });

        assert_eq!(router.records_written(), 0);
        assert_eq!(router.into_writer().close().unwrap().len(), 8);
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() == 8 {
                Ok(8)
            } else {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_counted_not_fatal() {
        let mut writer = RecordWriter::new(FailingSink);
        writer.write_header(0).unwrap();
        let time_ref = TimeReference::new(0, Instant::now());
        let mut router = FrameRouter::new(time_ref, writer, SystemClock);

        router.on_frame(&euler_frame(MessageClass::LogEcom0, LOG_EKF_EULER));
        router.on_frame(&euler_frame(MessageClass::LogEcom0, LOG_EKF_EULER));
        assert_eq!(router.write_errors(), 2);
        assert_eq!(router.records_written(), 0);
    }
}
