use imu_traits::{ImuError, Transport};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

pub const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial link to the sensor, 8N1 without flow control.
pub struct SerialTransport {
    serial_port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, ImuError> {
        let serial_port = serialport::new(port_name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| ImuError::DeviceError(format!("unable to open {}: {}", port_name, e)))?;
        info!("Opened port {} at {} baud", port_name, baud_rate);
        Ok(SerialTransport { serial_port })
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, ImuError> {
        match self.serial_port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(ImuError::ReadError(format!("Failed to read data: {}", e))),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), ImuError> {
        self.serial_port
            .write_all(data)
            .map_err(|e| ImuError::WriteError(format!("Failed to write data: {}", e)))
    }

    fn close(mut self) -> Result<(), ImuError> {
        let result = self.serial_port.flush().map_err(ImuError::from);
        debug!("Closing port {:?}", self.serial_port.name());
        result
    }
}
