// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! PII column obfuscation for tabular files.
//!
//! Given a locator such as `s3://bucket/new_data/students.csv`, the engine
//! fetches the object through an [`ObjectStore`], decodes it by extension
//! (csv, json or parquet), keeps a primary key column intact, overwrites the
//! requested PII columns with a fixed token and re-encodes the table in the
//! source format.  The returned bytes are ready to be written wherever the
//! caller likes; the engine itself never writes.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod locator;
pub mod store;
pub mod table;

pub use config::{ObfuscatorConfig, parse_field_list};
pub use engine::{Obfuscation, ObfuscationReport, Obfuscator};
pub use error::{ErrorKind, ObfuscationError, Result};
pub use format::Format;
pub use locator::SourceLocator;
pub use store::{FsObjectStore, MemoryObjectStore, ObjectStore, StoreError};
pub use table::{Column, DataType, Table, Value};

/// Obfuscate one object with the default configuration.
pub fn obfuscate<S: ObjectStore + ?Sized>(
    store: &S,
    locator: &str,
    pii_fields: &[String],
    primary_key: Option<&str>,
) -> Result<Vec<u8>> {
    Obfuscator::default().obfuscate(store, locator, pii_fields, primary_key)
}
