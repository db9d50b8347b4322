// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Obfuscation orchestrator.
//!
//! One call walks a fixed sequence: resolve the format from the locator,
//! load the table, reject empty input, resolve the primary key, mask, and
//! re-encode in the source format.  The first failing step ends the call;
//! its error is logged with the locator and kind and handed back unchanged.

pub mod detector;
pub mod masking;

pub use detector::{candidates, detect_primary_key};
pub use masking::{Masked, effective_fields, mask};

use crate::config::ObfuscatorConfig;
use crate::error::{ObfuscationError, Result};
use crate::format::Format;
use crate::locator::SourceLocator;
use crate::store::{ObjectStore, StoreError};
use crate::table::Table;
use serde::Serialize;
use tracing::{error, info, info_span, warn};

/// What a successful call did, for logs and status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObfuscationReport {
    pub locator: String,
    pub format: Format,
    pub rows: usize,
    pub primary_key: String,
    pub primary_key_detected: bool,
    pub masked_columns: Vec<String>,
    pub bytes: usize,
}

/// Encoded output plus its report.
#[derive(Debug, Clone)]
pub struct Obfuscation {
    pub bytes: Vec<u8>,
    pub report: ObfuscationReport,
}

/// The engine.  Holds only immutable configuration, so one instance can
/// serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Obfuscator {
    config: ObfuscatorConfig,
}

impl Obfuscator {
    pub fn new(config: ObfuscatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ObfuscatorConfig {
        &self.config
    }

    /// Load `locator` from `store`, mask `pii_fields` and return the encoded
    /// result in the source format.  `primary_key` is trusted verbatim; when
    /// it is `None` (or empty) the key is detected from the data.
    pub fn obfuscate<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        locator: &str,
        pii_fields: &[String],
        primary_key: Option<&str>,
    ) -> Result<Vec<u8>> {
        self.obfuscate_with_report(store, locator, pii_fields, primary_key)
            .map(|done| done.bytes)
    }

    pub fn obfuscate_with_report<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        locator: &str,
        pii_fields: &[String],
        primary_key: Option<&str>,
    ) -> Result<Obfuscation> {
        let _span = info_span!("obfuscate", locator).entered();
        let outcome = SourceLocator::parse(locator).and_then(|locator| {
            let table = load(store, &locator)?;
            self.process(&locator, table, pii_fields, primary_key)
        });
        outcome.inspect_err(|err| log_failure(locator, err))
    }

    /// Same as [`Obfuscator::obfuscate`] for bytes the caller already
    /// fetched.  The locator still selects the format and labels errors.
    pub fn obfuscate_bytes(
        &self,
        locator: &str,
        bytes: &[u8],
        pii_fields: &[String],
        primary_key: Option<&str>,
    ) -> Result<Obfuscation> {
        let _span = info_span!("obfuscate", locator).entered();
        let outcome = SourceLocator::parse(locator).and_then(|locator| {
            let table = locator.format().decode(bytes)?;
            self.process(&locator, table, pii_fields, primary_key)
        });
        outcome.inspect_err(|err| log_failure(locator, err))
    }

    /// Run the engine up to primary-key resolution and report the key that
    /// would be kept, without masking anything.
    pub fn detect<S: ObjectStore + ?Sized>(
        &self,
        store: &S,
        locator: &str,
        pii_fields: &[String],
    ) -> Result<String> {
        let _span = info_span!("detect", locator).entered();
        let outcome = SourceLocator::parse(locator).and_then(|locator| {
            let table = load(store, &locator)?;
            ensure_not_empty(&table, &locator)?;
            resolve_primary_key(&table, &locator, pii_fields, None).map(|(key, _)| key)
        });
        outcome.inspect_err(|err| log_failure(locator, err))
    }

    fn process(
        &self,
        locator: &SourceLocator,
        table: Table,
        pii_fields: &[String],
        primary_key: Option<&str>,
    ) -> Result<Obfuscation> {
        ensure_not_empty(&table, locator)?;
        let rows = table.row_count();

        let (primary_key, detected) = resolve_primary_key(&table, locator, pii_fields, primary_key)?;
        info!(primary_key = %primary_key, detected, "primary key resolved");

        let masked = mask(table, pii_fields, &primary_key, self.config.mask_token())?;
        let bytes = locator.format().encode(&masked.table)?;
        info!(bytes = bytes.len(), format = %locator.format(), "output buffer created");

        Ok(Obfuscation {
            report: ObfuscationReport {
                locator: locator.to_string(),
                format: locator.format(),
                rows,
                primary_key,
                primary_key_detected: detected,
                masked_columns: masked.columns,
                bytes: bytes.len(),
            },
            bytes,
        })
    }
}

/// Fetch and decode the object a locator points at.
pub fn load<S: ObjectStore + ?Sized>(store: &S, locator: &SourceLocator) -> Result<Table> {
    let bytes = store
        .get(locator.container(), locator.key())
        .map_err(|err| match err {
            StoreError::NotFound { .. } => ObfuscationError::SourceNotFound {
                locator: locator.to_string(),
            },
            other => ObfuscationError::Storage {
                locator: locator.to_string(),
                detail: other.to_string(),
            },
        })?;
    let table = locator.format().decode(&bytes)?;
    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        format = %locator.format(),
        "loaded source"
    );
    Ok(table)
}

fn ensure_not_empty(table: &Table, locator: &SourceLocator) -> Result<()> {
    if table.is_empty() {
        return Err(ObfuscationError::EmptyInput {
            locator: locator.to_string(),
        });
    }
    Ok(())
}

/// Caller-supplied keys win and are not checked against the table; an
/// unknown key simply protects nothing, which is logged.
fn resolve_primary_key(
    table: &Table,
    locator: &SourceLocator,
    pii_fields: &[String],
    supplied: Option<&str>,
) -> Result<(String, bool)> {
    if let Some(key) = supplied.filter(|key| !key.is_empty()) {
        if table.column(key).is_none() {
            warn!(primary_key = key, "supplied primary key is not a column of the source");
        }
        return Ok((key.to_string(), false));
    }

    detect_primary_key(table, pii_fields)
        .map(|key| (key.to_string(), true))
        .ok_or_else(|| ObfuscationError::NoPrimaryKeyDetected {
            locator: locator.to_string(),
        })
}

fn log_failure(locator: &str, err: &ObfuscationError) {
    error!(locator, kind = %err.kind(), "obfuscation failed: {err}");
}
