// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Reversible transform applied to every blob the archive stores, whether it is a full
/// snapshot or a serialized patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codec {
    level: i32,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Codec {
    /// `level` is clamped to the range supported by zstd.
    pub fn new(level: i32) -> Self {
        let range = zstd::compression_level_range();
        Self {
            level: level.clamp(*range.start(), *range.end()),
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn encode(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        zstd::encode_all(data, self.level)
    }

    /// Fails on anything that is not a complete zstd frame sequence.
    pub fn decode(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        zstd::decode_all(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn codec_roundtrip(data: Vec<u8>) {
        let codec = Codec::default();
        let encoded = codec.encode(&data).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), data);
    }

    #[quickcheck]
    fn codec_roundtrip_text(text: String, level: i8) {
        let codec = Codec::new(level.into());
        let encoded = codec.encode(text.as_bytes()).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), text.as_bytes());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let codec = Codec::default();
        assert!(codec.decode(b"definitely not zstd").is_err());

        let mut encoded = codec.encode(&b"<html>hello</html>".repeat(64)).unwrap();
        encoded.truncate(encoded.len() / 2);
        assert!(codec.decode(&encoded).is_err());
    }

    #[test]
    fn test_level_is_clamped() {
        let range = zstd::compression_level_range();
        assert_eq!(Codec::new(i32::MAX).level(), *range.end());
        assert_eq!(Codec::new(i32::MIN).level(), *range.start());
    }

    #[test]
    fn test_repetitive_markup_shrinks() {
        let codec = Codec::default();
        let page = "<div class=\"row\"><span>cell</span></div>\n".repeat(500);
        assert!(codec.encode(page.as_bytes()).unwrap().len() < page.len() / 10);
    }
}
