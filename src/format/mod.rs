// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Format adapters.  Each supported serialisation registers one decode and
//! one encode function in [`CODECS`]; adding a format means adding a variant
//! and one registry entry.

mod csv_codec;
mod json_codec;
mod parquet_codec;

use crate::error::ObfuscationError;
use crate::table::{Table, TableError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Closed set of formats the engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

/// Failure inside a single codec, before it is tagged with the format.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Parquet(#[from] ::parquet::errors::ParquetError),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Invalid(String),
}

type DecodeFn = fn(&[u8]) -> Result<Table, CodecError>;
type EncodeFn = fn(&Table) -> Result<Vec<u8>, CodecError>;

struct Codec {
    format: Format,
    decode: DecodeFn,
    encode: EncodeFn,
}

static CODECS: [Codec; 3] = [
    Codec {
        format: Format::Csv,
        decode: csv_codec::decode,
        encode: csv_codec::encode,
    },
    Codec {
        format: Format::Json,
        decode: json_codec::decode,
        encode: json_codec::encode,
    },
    Codec {
        format: Format::Parquet,
        decode: parquet_codec::decode,
        encode: parquet_codec::encode,
    },
];

impl Format {
    pub const ALL: [Format; 3] = [Format::Csv, Format::Json, Format::Parquet];

    /// Map a file extension (any case) onto a supported format.
    pub fn from_extension(extension: &str) -> Option<Format> {
        let lowered = extension.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == lowered)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Parquet => "parquet",
        }
    }

    fn codec(self) -> Result<&'static Codec, CodecError> {
        CODECS
            .iter()
            .find(|codec| codec.format == self)
            .ok_or_else(|| CodecError::Invalid(format!("no codec registered for {self}")))
    }

    /// Decode raw bytes of this format into a table.
    pub fn decode(self, bytes: &[u8]) -> Result<Table, ObfuscationError> {
        self.codec()
            .and_then(|codec| (codec.decode)(bytes))
            .map_err(|err| ObfuscationError::Decode {
                format: self,
                detail: err.to_string(),
            })
    }

    /// Encode a table as this format.  The returned buffer is complete and
    /// read from offset zero.
    pub fn encode(self, table: &Table) -> Result<Vec<u8>, ObfuscationError> {
        self.codec()
            .and_then(|codec| (codec.encode)(table))
            .map_err(|err| ObfuscationError::Encode {
                format: self,
                detail: err.to_string(),
            })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
