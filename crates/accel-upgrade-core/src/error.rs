//! Error types for config conversion and load planning

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E101: Operation flags missing or conflicting
    E101InvalidArguments,
    /// E102: CIDR string could not be parsed
    E102MalformedCidr,
    /// E103: Member accounts of an OU could not be resolved
    E103UnresolvedAccountMembership,
    /// E104: Required field absent from a VPC or subnet entry
    E104MissingField,
    /// E105: Document section has an unexpected shape
    E105InvalidDocument,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E101InvalidArguments => "E101",
            Self::E102MalformedCidr => "E102",
            Self::E103UnresolvedAccountMembership => "E103",
            Self::E104MissingField => "E104",
            Self::E105InvalidDocument => "E105",
        }
    }
}

/// Errors raised while converting a config document or planning a CIDR load
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("[{code}] Invalid arguments: {message}")]
    InvalidArguments { code: &'static str, message: String },

    #[error("[{code}] Malformed CIDR '{value}' at {location}: {reason}")]
    MalformedCidr {
        code: &'static str,
        value: String,
        location: String,
        reason: String,
    },

    /// An account entry has no usable `ou`, so OU membership cannot be computed
    #[error("[{code}] Cannot resolve accounts of OU '{ou}': account '{account}' has no 'ou' field")]
    UnresolvedAccountMembership {
        code: &'static str,
        ou: String,
        account: String,
    },

    #[error("[{code}] Missing field '{field}' at {location}")]
    MissingField {
        code: &'static str,
        field: String,
        location: String,
    },

    #[error("[{code}] Invalid document: {message}")]
    InvalidDocument { code: &'static str, message: String },
}

impl MigrationError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            code: ErrorCode::E101InvalidArguments.as_str(),
            message: message.into(),
        }
    }

    pub fn malformed_cidr(
        value: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedCidr {
            code: ErrorCode::E102MalformedCidr.as_str(),
            value: value.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn unresolved_membership(ou: impl Into<String>, account: impl Into<String>) -> Self {
        Self::UnresolvedAccountMembership {
            code: ErrorCode::E103UnresolvedAccountMembership.as_str(),
            ou: ou.into(),
            account: account.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>, location: impl Into<String>) -> Self {
        Self::MissingField {
            code: ErrorCode::E104MissingField.as_str(),
            field: field.into(),
            location: location.into(),
        }
    }

    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            code: ErrorCode::E105InvalidDocument.as_str(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArguments { code, .. }
            | Self::MalformedCidr { code, .. }
            | Self::UnresolvedAccountMembership { code, .. }
            | Self::MissingField { code, .. }
            | Self::InvalidDocument { code, .. } => code,
        }
    }
}

/// Result type alias for MigrationError
pub type Result<T> = std::result::Result<T, MigrationError>;
