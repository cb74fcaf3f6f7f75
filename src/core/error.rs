use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Unknown poll quality category: {0:?}")]
    UnknownPollQuality(String),

    #[error("Locale not found: {0}")]
    LocaleNotFound(String),

    #[error("Duplicate locale code: {0}")]
    DuplicateLocale(String),

    #[error("Electoral votes sum to {found}, expected {expected}")]
    ElectoralVoteTotal { expected: u32, found: u32 },

    #[error("Invalid electoral votes: {0}")]
    InvalidElectoralVotes(String),

    #[error("Invalid split group: {0}")]
    InvalidSplitGroup(String),

    #[error("Invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("Non-finite margin {margin} for locale {code}")]
    NonFiniteMargin { code: String, margin: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ForecastError {
    /// Configuration errors abort a run before any trial executes
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ForecastError::UnknownPollQuality(_)
                | ForecastError::LocaleNotFound(_)
                | ForecastError::DuplicateLocale(_)
                | ForecastError::ElectoralVoteTotal { .. }
                | ForecastError::InvalidElectoralVotes(_)
                | ForecastError::InvalidSplitGroup(_)
                | ForecastError::InvalidCalibration(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
