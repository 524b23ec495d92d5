use crate::writer::{Record, HEADER_SIZE, RECORD_SIZE};
use byteorder::{ByteOrder, NativeEndian};
use imu_traits::EulerAngles;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Reads back a log produced by `RecordWriter`.
pub struct LogReader<R: Read> {
    inner: R,
    wall_clock_secs: i64,
    truncated_bytes: usize,
}

impl LogReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        LogReader::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> LogReader<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let mut header = [0u8; HEADER_SIZE];
        inner.read_exact(&mut header)?;
        Ok(LogReader {
            inner,
            wall_clock_secs: NativeEndian::read_i64(&header),
            truncated_bytes: 0,
        })
    }

    /// Unix time of the second boundary all records are relative to.
    pub fn wall_clock_secs(&self) -> i64 {
        self.wall_clock_secs
    }

    /// Bytes of an incomplete final record, if the capture was cut mid-write.
    pub fn truncated_bytes(&self) -> usize {
        self.truncated_bytes
    }

    /// Next complete record, or `None` at end of file.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        let mut buffer = [0u8; RECORD_SIZE];
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        match filled {
            0 => Ok(None),
            RECORD_SIZE => Ok(Some(Record {
                elapsed_us: NativeEndian::read_i64(&buffer[0..8]),
                euler: EulerAngles::new(
                    NativeEndian::read_f32(&buffer[8..12]),
                    NativeEndian::read_f32(&buffer[12..16]),
                    NativeEndian::read_f32(&buffer[16..20]),
                ),
            })),
            partial => {
                warn!("Ignoring {} trailing bytes of a truncated record", partial);
                self.truncated_bytes = partial;
                Ok(None)
            }
        }
    }

    pub fn records(mut self) -> io::Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record()? {
            records.push(record);
        }
        Ok(records)
    }
}
