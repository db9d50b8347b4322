// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Error taxonomy for the obfuscation engine.  Callers match on [`ErrorKind`]
//! rather than on message text; the text is for humans and logs only.

use crate::format::Format;
use std::fmt;
use thiserror::Error;

/// Every way an obfuscation call can fail.
#[derive(Debug, Error)]
pub enum ObfuscationError {
    #[error("unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("source not found: {locator}")]
    SourceNotFound { locator: String },

    #[error("storage error for {locator}: {detail}")]
    Storage { locator: String, detail: String },

    #[error("failed to decode {format} data: {detail}")]
    Decode { format: Format, detail: String },

    #[error("the input data is empty: {locator}")]
    EmptyInput { locator: String },

    #[error(
        "no primary key detected in {locator}; data records must be supplied with a primary key"
    )]
    NoPrimaryKeyDetected { locator: String },

    #[error("no PII columns found to obfuscate")]
    NoColumnsObfuscated,

    #[error("failed to encode {format} data: {detail}")]
    Encode { format: Format, detail: String },
}

/// Coarse classification of [`ObfuscationError`] used for dispatch, logging
/// and process exit codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    SourceNotFound,
    Storage,
    Decode,
    EmptyInput,
    NoPrimaryKeyDetected,
    NoColumnsObfuscated,
    Encode,
}

impl ObfuscationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::EmptyInput { .. } => ErrorKind::EmptyInput,
            Self::NoPrimaryKeyDetected { .. } => ErrorKind::NoPrimaryKeyDetected,
            Self::NoColumnsObfuscated => ErrorKind::NoColumnsObfuscated,
            Self::Encode { .. } => ErrorKind::Encode,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl ErrorKind {
    /// Only transient storage failures are worth retrying; everything else
    /// needs the caller to change the request or the data.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Storage)
    }

    /// Stable process exit code for each kind.  `2` is left for usage errors.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::UnsupportedFormat => 3,
            ErrorKind::SourceNotFound => 4,
            ErrorKind::Storage => 5,
            ErrorKind::Decode => 6,
            ErrorKind::EmptyInput => 7,
            ErrorKind::NoPrimaryKeyDetected => 8,
            ErrorKind::NoColumnsObfuscated => 9,
            ErrorKind::Encode => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::SourceNotFound => "source_not_found",
            ErrorKind::Storage => "storage",
            ErrorKind::Decode => "decode",
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::NoPrimaryKeyDetected => "no_primary_key_detected",
            ErrorKind::NoColumnsObfuscated => "no_columns_obfuscated",
            ErrorKind::Encode => "encode",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T, E = ObfuscationError> = std::result::Result<T, E>;
