use std::fmt;

/// Errors raised while deriving returns from historical prices
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Fewer than two price points; no return can be derived
    InsufficientData { points: usize },
    /// A price of zero, below zero, or not finite
    NonPositivePrice { index: usize, price: f64 },
    /// Timestamp at `index` does not come strictly after the one before it
    NonIncreasingTimestamp { index: usize },
    /// A return series was built from an empty sequence
    EmptyReturns,
    /// A pre-computed log return is NaN or infinite
    NonFiniteReturn { index: usize },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::InsufficientData { points } => {
                write!(f, "need at least 2 price points, got {points}")
            }
            DataError::NonPositivePrice { index, price } => {
                write!(f, "price at index {index} must be positive, got {price}")
            }
            DataError::NonIncreasingTimestamp { index } => {
                write!(f, "timestamp at index {index} is not after the previous one")
            }
            DataError::EmptyReturns => write!(f, "return series is empty"),
            DataError::NonFiniteReturn { index } => {
                write!(f, "log return at index {index} is not finite")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Errors raised when validating simulation inputs, before any work starts
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    ZeroHorizon,
    HorizonTooLong { horizon: u32, max: u32 },
    NegativePrincipal(f64),
    /// Named field is NaN or infinite
    NonFinite(&'static str),
    ZeroIterations,
    ZeroChunkSize,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::ZeroHorizon => write!(f, "horizon must be at least one period"),
            ParameterError::HorizonTooLong { horizon, max } => {
                write!(f, "horizon of {horizon} periods exceeds the maximum of {max}")
            }
            ParameterError::NegativePrincipal(p) => {
                write!(f, "principal must not be negative, got {p}")
            }
            ParameterError::NonFinite(field) => write!(f, "{field} must be a finite number"),
            ParameterError::ZeroIterations => write!(f, "iteration count must be at least one"),
            ParameterError::ZeroChunkSize => write!(f, "chunk size must be at least one"),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Errors raised when assembling trajectories into a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchError {
    Empty,
    /// Trajectory at `index` has a different length than the first one
    Misaligned {
        index: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Empty => write!(f, "batch contains no trajectories"),
            BatchError::Misaligned {
                index,
                expected,
                found,
            } => write!(
                f,
                "trajectory {index} has {found} points, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for BatchError {}

/// Errors raised by percentile/value queries
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Query issued before any simulation produced a distribution
    EmptyDistribution,
    InvalidProbability(f64),
    InvalidValue(f64),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::EmptyDistribution => write!(f, "distribution unavailable"),
            QueryError::InvalidProbability(p) => write!(f, "invalid probability {p}"),
            QueryError::InvalidValue(v) => write!(f, "invalid value {v}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Top-level error for a simulation request
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    Data(DataError),
    Parameters(ParameterError),
    Batch(BatchError),
    /// Run was superseded or cancelled by the caller
    Cancelled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Data(e) => write!(f, "data fault: {e}"),
            SimulationError::Parameters(e) => write!(f, "invalid parameters: {e}"),
            SimulationError::Batch(e) => write!(f, "{e}"),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Data(e) => Some(e),
            SimulationError::Parameters(e) => Some(e),
            SimulationError::Batch(e) => Some(e),
            SimulationError::Cancelled => None,
        }
    }
}

impl From<DataError> for SimulationError {
    fn from(err: DataError) -> Self {
        SimulationError::Data(err)
    }
}

impl From<ParameterError> for SimulationError {
    fn from(err: ParameterError) -> Self {
        SimulationError::Parameters(err)
    }
}

impl From<BatchError> for SimulationError {
    fn from(err: BatchError) -> Self {
        SimulationError::Batch(err)
    }
}
