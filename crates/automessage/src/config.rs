// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine configuration and format constants.
//!
//! The defaults can be overridden with environment variables:
//!
//! - `AUTOMESSAGE_MAX_SEQUENCE_LEN`: largest element count accepted on decode
//! - `AUTOMESSAGE_MAX_STRING_BYTES`: largest string byte count accepted on decode

/// Polynomial base of the schema fingerprint.
pub const FINGERPRINT_BASE: i64 = 31;

/// Modulus of the schema fingerprint.
pub const FINGERPRINT_MODULUS: i64 = 1_000_000_009;

/// Size of the signed 32-bit count in front of every sequence and string.
pub const COUNT_PREFIX_SIZE: usize = 4;

/// Suffix marking a sequence type name (`Int32[]`).
pub const ARRAY_SUFFIX: &str = "[]";

pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 16 * 1024 * 1024;
pub const DEFAULT_MAX_STRING_BYTES: usize = 64 * 1024 * 1024;

/// Runtime knobs for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Decoded sequence counts above this are rejected as invalid data.
    pub max_sequence_len: usize,
    /// Decoded string byte counts above this are rejected as invalid data.
    pub max_string_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sequence_len: std::env::var("AUTOMESSAGE_MAX_SEQUENCE_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_SEQUENCE_LEN),
            max_string_bytes: std::env::var("AUTOMESSAGE_MAX_STRING_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_STRING_BYTES),
        }
    }
}

impl EngineConfig {
    pub fn with_max_sequence_len(mut self, len: usize) -> Self {
        self.max_sequence_len = len;
        self
    }

    pub fn with_max_string_bytes(mut self, bytes: usize) -> Self {
        self.max_string_bytes = bytes;
        self
    }

    pub(crate) fn limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_sequence_len: self.max_sequence_len,
            max_string_bytes: self.max_string_bytes,
        }
    }
}

/// Copy of the decode bounds captured by compiled codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecodeLimits {
    pub max_sequence_len: usize,
    pub max_string_bytes: usize,
}
