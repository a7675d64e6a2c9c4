// Core structs: raw/cleaned series, decomposition output, error kinds
use chrono::{DateTime, Utc};

/// One row of the provider's table: a timestamp, one value per keyword column
/// and the provider's completeness flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub timestamp: DateTime<Utc>,
    pub values: Vec<f64>,
    pub is_partial: bool,
}

/// Table as returned by a `TrendsSource`, before any cleaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendsFrame {
    pub columns: Vec<String>,
    pub rows: Vec<RawObservation>,
}

impl TrendsFrame {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cleaned table: no completeness flag, strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendsTable {
    pub columns: Vec<String>,
    pub index: Vec<DateTime<Utc>>,
    pub values: Vec<Vec<f64>>,
}

impl TrendsTable {
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Single keyword series, strictly increasing in timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedSeries {
    pub keyword: String,
    pub points: Vec<(DateTime<Utc>, f64)>,
}

impl CleanedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|(t, _)| *t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }
}

/// Number of samples per seasonal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonalPeriod(usize);

impl SeasonalPeriod {
    pub const WEEKLY: SeasonalPeriod = SeasonalPeriod(7);
    pub const YEARLY_BY_WEEK: SeasonalPeriod = SeasonalPeriod(52);
    pub const YEARLY_BY_MONTH: SeasonalPeriod = SeasonalPeriod(12);

    /// Returns `None` for zero.
    pub fn new(samples: usize) -> Option<Self> {
        (samples > 0).then_some(Self(samples))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SeasonalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Additive components aligned with the input index.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionResult {
    pub original: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl DecompositionResult {
    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub date: DateTime<Utc>,
    pub original: f64,
    pub trend: f64,
    pub seasonal: f64,
    pub remainder: f64,
}

/// Row-per-date table handed to export and display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub const COLUMNS: [&'static str; 5] = ["date", "original", "trend", "seasonal", "remainder"];

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub keyword: String,
    pub period: SeasonalPeriod,
    pub table: ResultTable,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("rate limited by the source (429)")]
    RateLimited,
    #[error("malformed response: {0}")]
    Parse(String),
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(_) | FetchError::Timeout | FetchError::RateLimited => true,
            FetchError::Status(code) => matches!(code, 500 | 502 | 504),
            FetchError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::from_status(status.as_u16())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

impl FetchError {
    pub fn from_status(code: u16) -> Self {
        if code == 429 {
            FetchError::RateLimited
        } else {
            FetchError::Status(code)
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DecompositionError {
    #[error("series is empty")]
    EmptySeries,
    #[error("period must be >= 2, got {0}")]
    InvalidPeriod(usize),
    #[error("series of {len} points is too short for period {period} (need at least {needed})")]
    SeriesTooShort {
        len: usize,
        period: usize,
        needed: usize,
    },
    #[error("non-finite value at index {0}")]
    NonFiniteValue(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Terminal failure of one pipeline run.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Please enter a keyword.")]
    InvalidInput,
    #[error("Error fetching data from Google Trends: {0}")]
    FetchFailure(#[from] FetchError),
    #[error("No data returned by Google Trends for '{keyword}' in this timeframe/geo.")]
    EmptyResult { keyword: String },
    #[error("Column '{column}' not found in Trends result.")]
    ColumnMismatch { column: String },
    #[error("STL decomposition failed: {0}")]
    DecompositionFailure(#[from] DecompositionError),
}

impl PipelineError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput => "input",
            PipelineError::FetchFailure(_) | PipelineError::EmptyResult { .. } => "fetch",
            PipelineError::ColumnMismatch { .. } => "select",
            PipelineError::DecompositionFailure(_) => "decompose",
        }
    }
}
