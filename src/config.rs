// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Engine configuration and helpers for the comma-separated field lists the
//! binaries accept from flags and environment variables.

use std::env;
use thiserror::Error;

/// Token written into every masked cell unless configured otherwise.
pub const DEFAULT_MASK_TOKEN: &str = "***";

/// Environment variable overriding the mask token.
pub const MASK_TOKEN_ENV: &str = "OBFUSCATOR_MASK_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("mask token cannot be empty")]
    EmptyMaskToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfuscatorConfig {
    mask_token: String,
}

impl Default for ObfuscatorConfig {
    fn default() -> Self {
        Self {
            mask_token: DEFAULT_MASK_TOKEN.to_string(),
        }
    }
}

impl ObfuscatorConfig {
    pub fn new(mask_token: impl Into<String>) -> Result<Self, ConfigError> {
        let mask_token = mask_token.into();
        if mask_token.is_empty() {
            return Err(ConfigError::EmptyMaskToken);
        }
        Ok(Self { mask_token })
    }

    /// Defaults, with the mask token taken from `OBFUSCATOR_MASK_TOKEN` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(MASK_TOKEN_ENV) {
            Ok(token) => Self::new(token),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn mask_token(&self) -> &str {
        &self.mask_token
    }
}

/// Split `name, email_address,,phone` into trimmed, non-empty field names.
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}
