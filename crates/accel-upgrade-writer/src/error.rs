//! Error types for the assignment table writer

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E201: AWS client could not be configured
    E201ClientInit,
    /// E202: A single table write was rejected
    E202WriteFailure,
    /// E203: Table naming or region settings invalid
    E203InvalidConfig,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E201ClientInit => "E201",
            Self::E202WriteFailure => "E202",
            Self::E203InvalidConfig => "E203",
        }
    }
}

/// Errors that can occur while writing CIDR assignment records
#[derive(Debug, Error)]
pub enum WriterError {
    /// AWS client setup failed
    #[error("[{code}] Could not configure DynamoDB client for region '{region}': {reason}\n\nTroubleshooting:\n  • Check credentials: aws sts get-caller-identity\n  • Verify the region name")]
    ClientInit {
        code: &'static str,
        region: String,
        reason: String,
    },

    /// A put was rejected by the table
    #[error("[{code}] Write to '{table}' failed for record {id}: {reason}")]
    WriteFailure {
        code: &'static str,
        /// The table name
        table: String,
        /// Id of the rejected record
        id: u64,
        reason: String,
    },

    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },
}

impl WriterError {
    pub fn client_init(region: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ClientInit {
            code: ErrorCode::E201ClientInit.as_str(),
            region: region.into(),
            reason: reason.into(),
        }
    }

    /// Create a write failure error with error code
    pub fn write_failure(table: impl Into<String>, id: u64, reason: impl Into<String>) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E202WriteFailure.as_str(),
            table: table.into(),
            id,
            reason: reason.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E203InvalidConfig.as_str(),
            message: message.into(),
        }
    }
}

/// Result type alias for WriterError
pub type Result<T> = std::result::Result<T, WriterError>;
