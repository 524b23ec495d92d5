use crate::error::AcquisitionError;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::ffi::c_int;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;

/// Signals that stop a capture. Everything else keeps its default disposition.
pub const TERMINATION_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Process-wide stop request, raised by SIGINT/SIGTERM and polled by the loop.
///
/// Once set it stays set; further signals are no-ops.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
    signal: Arc<AtomicI32>,
}

pub fn signal_name(signal: c_int) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        _ => "unknown signal",
    }
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the interrupt and terminate handlers. Call once per process,
    /// before any device or file is opened.
    pub fn install() -> Result<Self, AcquisitionError> {
        let flag = ShutdownFlag::new();
        let mut signals = Signals::new(TERMINATION_SIGNALS)
            .map_err(|e| AcquisitionError::Signal(e.to_string()))?;

        let for_signal = flag.clone();
        thread::Builder::new()
            .name("signals".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    eprintln!("Process received termination signal ({})", signal_name(signal));
                    for_signal.request_by(signal);
                }
            })
            .map_err(|e| AcquisitionError::Signal(e.to_string()))?;
        Ok(flag)
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    fn request_by(&self, signal: c_int) {
        let _ = self
            .signal
            .compare_exchange(0, signal, Ordering::SeqCst, Ordering::SeqCst);
        self.request();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// The first signal that requested shutdown, if any.
    pub fn received_signal(&self) -> Option<c_int> {
        match self.signal.load(Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }
}
