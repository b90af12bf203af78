use thiserror::Error;

/// Errors from [`crate::travel_time::TravelTimeOracle::shortest_path`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The provider could not find any path between the two points.
    #[error("no route could be computed between the requested points")]
    NoRoute,

    /// The request to the routing service timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// A network error occurred while contacting the routing service.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// The URL that was requested.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// The routing service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Error message from the response.
        message: String,
    },

    /// The routing service reported an application-level error.
    #[error("routing service error ({code}): {message}")]
    ServiceError {
        /// Error code from the service.
        code: String,
        /// Error message from the service.
        message: String,
    },

    /// The response could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Description of the parse failure.
        message: String,
    },
}

/// Errors from [`crate::travel_time::build_time_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixBuildError {
    /// No coordinates were supplied.
    #[error("at least one coordinate is required")]
    EmptyInput,

    /// The oracle failed for one ordered pair.
    #[error("oracle failed between nodes {from} and {to}: {source}")]
    Oracle {
        /// Row index of the failing pair.
        from: usize,
        /// Column index of the failing pair.
        to: usize,
        /// Underlying oracle failure.
        #[source]
        source: OracleError,
    },
}

/// Errors from [`crate::travel_time::TimeMatrix::from_rows`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixShapeError {
    /// The matrix had no rows.
    #[error("matrix must contain at least one row")]
    Empty,

    /// A row length differed from the number of rows.
    #[error("row {row} has {actual} columns, expected {expected}")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Number of rows in the matrix.
        expected: usize,
        /// Columns found in the row.
        actual: usize,
    },

    /// A diagonal entry was not zero.
    #[error("diagonal entry {index} is {value}, expected 0")]
    NonZeroDiagonal {
        /// Diagonal position.
        index: usize,
        /// Value found there.
        value: u64,
    },
}
