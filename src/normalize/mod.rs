// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Content normalization applied to fetched pages before they are fingerprinted and stored.
//!
//! Changing the normalizer of an archive that already has history changes the fingerprints
//! of otherwise identical pages, so the next attempt for every page archives a new version.

/// Turns raw fetched content into the form the archive stores.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

/// Stores content exactly as fetched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Normalizer for Passthrough {
    fn normalize(&self, raw: &str) -> String {
        raw.to_owned()
    }
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, raw: &str) -> String {
        self(raw)
    }
}
