use crate::error::AcquisitionError;
use crate::rate::OutputRate;
use crate::router::FrameRouter;
use crate::shutdown::ShutdownFlag;
use crate::time_ref::{Clock, TimeReference};
use crate::writer::RecordWriter;
use imu_traits::{MessageClass, PollOutcome, ProtocolDecoder, Transport};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sleep between polls when the transport had nothing pending.
pub const IDLE_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub output_file: PathBuf,
    pub rate: OutputRate,
    pub idle_delay: Duration,
}

impl SessionConfig {
    pub fn new(output_file: impl Into<PathBuf>, rate: OutputRate) -> Self {
        SessionConfig {
            output_file: output_file.into(),
            rate,
            idle_delay: IDLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Running,
    ShuttingDown,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub state: AcquisitionState,
    pub records_written: u64,
    pub write_errors: u64,
    pub decode_errors: u64,
    pub polls: u64,
}

/// Sets the sensor output rate of the log the router records.
pub fn configure_output_rate<D: ProtocolDecoder>(
    decoder: &mut D,
    log_type: (MessageClass, u8),
    rate: OutputRate,
) -> Result<(), AcquisitionError> {
    let (class, id) = log_type;
    decoder
        .configure_output(class, id, rate.mode())
        .map_err(AcquisitionError::Configuration)?;
    info!("Output rate set to {} ({:?})", rate, rate.mode());
    Ok(())
}

/// Drives the decoder until shutdown is requested. Owns every resource of the session.
pub struct Acquisition<D: ProtocolDecoder, W: Write, C: Clock> {
    decoder: D,
    router: FrameRouter<W, C>,
    state: AcquisitionState,
    idle_delay: Duration,
    polls: u64,
    decode_errors: u64,
}

impl<D: ProtocolDecoder, W: Write, C: Clock> Acquisition<D, W, C> {
    pub fn new(decoder: D, router: FrameRouter<W, C>) -> Self {
        Acquisition {
            decoder,
            router,
            state: AcquisitionState::Running,
            idle_delay: IDLE_DELAY,
            polls: 0,
            decode_errors: 0,
        }
    }

    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Polls until `shutdown` is seen at the top of an iteration. A poll in
    /// progress, and any record it writes, always completes first.
    pub fn run(&mut self, shutdown: &ShutdownFlag) {
        while self.state == AcquisitionState::Running {
            if shutdown.is_requested() {
                self.state = AcquisitionState::ShuttingDown;
                break;
            }

            self.polls += 1;
            match self.decoder.poll(&mut self.router) {
                Ok(PollOutcome::NotReady) => thread::sleep(self.idle_delay),
                Ok(PollOutcome::Processed) => {}
                Err(e) => {
                    self.decode_errors += 1;
                    warn!("Unable to process incoming sbgECom logs: {}", e);
                }
            }
        }
        debug!("Acquisition loop left after {} polls", self.polls);
    }

    /// Releases the output file, then the decoder, then the transport.
    /// Teardown failures are logged and do not stop the remaining steps.
    pub fn close(self) -> SessionSummary {
        let records_written = self.router.records_written();
        let write_errors = self.router.write_errors();

        if let Err(e) = self.router.into_writer().close() {
            warn!("Failed to flush output file: {}", e);
        }
        match self.decoder.close() {
            Ok(transport) => {
                if let Err(e) = transport.close() {
                    warn!("Failed to close transport: {}", e);
                }
            }
            Err(e) => warn!("Failed to close decoder: {}", e),
        }

        info!(
            "Exiting. {} records written, {} decode errors, {} write errors",
            records_written, self.decode_errors, write_errors
        );
        SessionSummary {
            state: AcquisitionState::Terminated,
            records_written,
            write_errors,
            decode_errors: self.decode_errors,
            polls: self.polls,
        }
    }
}

/// Runs a whole capture: time sync, file header, decoder setup, rate
/// configuration, loop and teardown.
///
/// The output file is created before the sensor is touched; if a later
/// startup step fails it stays on disk holding only its header.
pub fn run_session<D, F, C>(
    config: &SessionConfig,
    clock: C,
    shutdown: &ShutdownFlag,
    open_decoder: F,
) -> Result<SessionSummary, AcquisitionError>
where
    D: ProtocolDecoder,
    F: FnOnce() -> Result<D, AcquisitionError>,
    C: Clock,
{
    info!("Waiting for the next second boundary");
    let time_ref = TimeReference::synchronize(&clock);
    info!("Time reference: {} s since Unix epoch", time_ref.wall_clock_secs());

    let mut writer = RecordWriter::create(&config.output_file)?;
    writer.write_header(time_ref.wall_clock_secs())?;

    let mut decoder = open_decoder()?;
    let router = FrameRouter::new(time_ref, writer, clock);
    configure_output_rate(&mut decoder, router.log_type(), config.rate)?;

    info!("Recording to {}", config.output_file.display());
    let mut acquisition = Acquisition::new(decoder, router).with_idle_delay(config.idle_delay);
    acquisition.run(shutdown);
    Ok(acquisition.close())
}
