use byteorder::{NativeEndian, WriteBytesExt};
use imu_traits::EulerAngles;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Size of the file header: one signed 64-bit Unix timestamp.
pub const HEADER_SIZE: usize = 8;
/// Size of one record: elapsed microseconds then roll, pitch, yaw.
pub const RECORD_SIZE: usize = 8 + 3 * 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub elapsed_us: i64,
    pub euler: EulerAngles,
}

/// Append-only writer for the binary attitude log.
///
/// Layout is host byte order with no padding, framing or checksum:
/// an 8-byte header, then 20-byte records. Every call flushes before it
/// returns, so an abrupt stop loses at most the record being written.
pub struct RecordWriter<W: Write> {
    inner: W,
    header_written: bool,
    records: u64,
}

impl RecordWriter<BufWriter<File>> {
    /// Creates the file, discarding anything already at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(RecordWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        RecordWriter {
            inner,
            header_written: false,
            records: 0,
        }
    }

    pub fn write_header(&mut self, wall_clock_secs: i64) -> io::Result<()> {
        if self.header_written {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "header already written",
            ));
        }
        self.inner.write_i64::<NativeEndian>(wall_clock_secs)?;
        self.inner.flush()?;
        self.header_written = true;
        Ok(())
    }

    pub fn append_record(&mut self, elapsed_us: i64, euler: &EulerAngles) -> io::Result<()> {
        if !self.header_written {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "record written before header",
            ));
        }
        let mut buffer = [0u8; RECORD_SIZE];
        {
            let mut cursor = &mut buffer[..];
            cursor.write_i64::<NativeEndian>(elapsed_us)?;
            for value in euler.to_array() {
                cursor.write_f32::<NativeEndian>(value)?;
            }
        }
        self.inner.write_all(&buffer)?;
        self.inner.flush()?;
        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    /// Flushes and hands back the underlying writer.
    pub fn close(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
