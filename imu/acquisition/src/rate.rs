use imu_traits::OutputMode;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Output frequencies the sensor can produce from its 200 Hz main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum OutputRate {
    #[strum(to_string = "200 Hz")]
    Hz200,
    #[strum(to_string = "100 Hz")]
    Hz100,
    #[strum(to_string = "50 Hz")]
    Hz50,
    #[strum(to_string = "40 Hz")]
    Hz40,
    #[strum(to_string = "25 Hz")]
    Hz25,
    #[strum(to_string = "20 Hz")]
    Hz20,
    #[strum(to_string = "10 Hz")]
    Hz10,
    #[strum(to_string = "5 Hz")]
    Hz5,
    #[strum(to_string = "1 Hz")]
    Hz1,
}

impl OutputRate {
    pub fn hz(&self) -> u32 {
        match self {
            OutputRate::Hz200 => 200,
            OutputRate::Hz100 => 100,
            OutputRate::Hz50 => 50,
            OutputRate::Hz40 => 40,
            OutputRate::Hz25 => 25,
            OutputRate::Hz20 => 20,
            OutputRate::Hz10 => 10,
            OutputRate::Hz5 => 5,
            OutputRate::Hz1 => 1,
        }
    }

    pub fn mode(&self) -> OutputMode {
        match self {
            OutputRate::Hz200 => OutputMode::MainLoop,
            OutputRate::Hz100 => OutputMode::Div2,
            OutputRate::Hz50 => OutputMode::Div4,
            OutputRate::Hz40 => OutputMode::Div5,
            OutputRate::Hz25 => OutputMode::Div8,
            OutputRate::Hz20 => OutputMode::Div10,
            OutputRate::Hz10 => OutputMode::Div20,
            OutputRate::Hz5 => OutputMode::Div40,
            OutputRate::Hz1 => OutputMode::Div200,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        OutputRate::iter().find(|rate| rate.hz() == hz)
    }

    /// "200, 100, 50, ..." for help and error text.
    pub fn supported_list() -> String {
        OutputRate::iter()
            .map(|rate| rate.hz().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// clap value parser for the frequency argument.
pub fn parse_frequency(value: &str) -> Result<OutputRate, String> {
    let hz: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a frequency in Hz", value))?;
    OutputRate::from_hz(hz).ok_or_else(|| {
        format!(
            "invalid frequency {} Hz, expected one of: {}",
            hz,
            OutputRate::supported_list()
        )
    })
}
