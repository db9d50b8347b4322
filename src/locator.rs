// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Source locators: `[scheme://]container/key`, with the format taken from
//! the trailing extension of the key.

use crate::error::ObfuscationError;
use crate::format::Format;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    raw: String,
    container: String,
    key: String,
    format: Format,
}

impl SourceLocator {
    /// Split a locator and resolve its format.  Only the extension is
    /// inspected, so an unsupported format is reported without touching
    /// storage.
    pub fn parse(raw: &str) -> Result<Self, ObfuscationError> {
        let extension = raw.rsplit('.').next().unwrap_or_default();
        let format = Format::from_extension(extension).ok_or_else(|| {
            ObfuscationError::UnsupportedFormat {
                extension: extension.to_ascii_lowercase(),
            }
        })?;

        let path = raw.split_once("://").map_or(raw, |(_, rest)| rest);
        let (container, key) = match path.split_once('/') {
            Some((container, key)) => (container.to_string(), key.to_string()),
            None => (String::new(), path.to_string()),
        };

        Ok(Self {
            raw: raw.to_string(),
            container,
            key,
            format,
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Final path segment of the key, e.g. `test_data.csv`.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_bucket_and_nested_key() {
        let locator = SourceLocator::parse("s3://ingestion/new_data/test_data.CSV").expect("parse");
        assert_eq!(locator.container(), "ingestion");
        assert_eq!(locator.key(), "new_data/test_data.CSV");
        assert_eq!(locator.format(), Format::Csv);
        assert_eq!(locator.file_name(), "test_data.CSV");
        assert_eq!(locator.to_string(), "s3://ingestion/new_data/test_data.CSV");
    }

    #[test]
    fn schemeless_locators_are_accepted() {
        let locator = SourceLocator::parse("raw/students.parquet").expect("parse");
        assert_eq!(locator.container(), "raw");
        assert_eq!(locator.key(), "students.parquet");

        let bare = SourceLocator::parse("students.json").expect("parse");
        assert_eq!(bare.container(), "");
        assert_eq!(bare.key(), "students.json");
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        let err = SourceLocator::parse("s3://bucket/notes.TXT").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.to_string(), "unsupported format: txt");
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let err = SourceLocator::parse("bucket/readme").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
