pub mod acquisition;
pub mod cli;
pub mod error;
pub mod rate;
pub mod reader;
pub mod router;
pub mod shutdown;
pub mod time_ref;
pub mod writer;

pub use acquisition::{
    configure_output_rate, run_session, Acquisition, AcquisitionState, SessionConfig,
    SessionSummary,
};
pub use error::AcquisitionError;
pub use rate::OutputRate;
pub use reader::LogReader;
pub use router::FrameRouter;
pub use shutdown::ShutdownFlag;
pub use time_ref::{Clock, SystemClock, TimeReference};
pub use writer::{Record, RecordWriter, HEADER_SIZE, RECORD_SIZE};
