use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical encoding of a measured column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Encoding {
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "dictionary")]
    Dictionary,
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "split+xor")]
    SplitXor,
    #[serde(rename = "split component")]
    SplitComponent,
    #[serde(rename = "split+rle")]
    SplitRle,
}

/// Harness token → canonical name → variant.
///
/// This table is the whole vocabulary. New encodings are added here and
/// nowhere else; a token missing from it is rejected, never guessed.
pub const VOCABULARY: [(&str, &str, Encoding); 6] = [
    ("no_enc", "plain", Encoding::Plain),
    ("dict", "dictionary", Encoding::Dictionary),
    ("fp", "split", Encoding::Split),
    ("fp_xor", "split+xor", Encoding::SplitXor),
    ("fp_comp", "split component", Encoding::SplitComponent),
    ("fp_rle", "split+rle", Encoding::SplitRle),
];

impl Encoding {
    /// Normalize a raw filename token such as `fp_xor`.
    pub fn from_raw(token: &str) -> Option<Self> {
        VOCABULARY
            .iter()
            .find(|(raw, _, _)| *raw == token)
            .map(|&(_, _, encoding)| encoding)
    }

    /// Look up a canonical name such as `split+xor`.
    pub fn from_canonical(name: &str) -> Option<Self> {
        VOCABULARY
            .iter()
            .find(|(_, canonical, _)| *canonical == name)
            .map(|&(_, _, encoding)| encoding)
    }

    /// The token the harness writes into file names.
    pub fn raw_token(self) -> &'static str {
        self.entry().0
    }

    /// The human-readable name used in reports.
    pub fn canonical(self) -> &'static str {
        self.entry().1
    }

    fn entry(self) -> &'static (&'static str, &'static str, Encoding) {
        VOCABULARY
            .iter()
            .find(|(_, _, encoding)| *encoding == self)
            .unwrap_or_else(|| unreachable!("every Encoding variant has a vocabulary entry"))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}
