// Record key grammar.
//
//   s/latest                          latest committed version
//   s/{height}                        commit info for one height
//   s/k:{module}/{sub_kind}{hash}     module-namespaced tree record
//
// The kind is chosen by the byte at index 2 alone.

use std::fmt;
use std::io::{self, Write};

use crate::hexfmt::to_hex;

/// Offset of the byte that selects the record kind.
const KIND_INDEX: usize = 2;
/// Offset where the module name of a keeper key starts (after `s/k:`).
const MODULE_START: usize = 4;

/// The three record kinds found in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// `s/latest`
    Version,
    /// `s/k:{module}/...`
    Keeper,
    /// `s/{height}`
    Block,
}

impl RecordKind {
    /// Classify a key by its third byte.
    ///
    /// Total over all inputs: keys too short to have a third byte are
    /// `Block`, like every other byte that is neither `k` nor `l`.
    pub fn classify(key: &[u8]) -> Self {
        match key.get(KIND_INDEX) {
            Some(b'k') => Self::Keeper,
            Some(b'l') => Self::Version,
            _ => Self::Block,
        }
    }
}

/// Height of a block key as raw text: everything from index 2 on.
pub fn block_height(key: &[u8]) -> &[u8] {
    key.get(KIND_INDEX..).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Keeper keys
// ---------------------------------------------------------------------------

/// Discriminator byte following the module separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubKind {
    /// `r`: the module's root hash.
    Root,
    /// `n`: a serialized tree node.
    Node,
    /// `o`: legacy record, printed as `oooo`.
    Legacy,
    /// Any other byte. Printed with an empty label.
    Unlabeled(u8),
}

impl SubKind {
    pub fn from_byte(b: u8) -> Self {
        match b {
            b'r' => Self::Root,
            b'n' => Self::Node,
            b'o' => Self::Legacy,
            other => Self::Unlabeled(other),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Node => "node",
            Self::Legacy => "oooo",
            Self::Unlabeled(_) => "",
        }
    }
}

impl fmt::Display for SubKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A keeper key split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperKey<'a> {
    /// Raw module name, not necessarily UTF-8.
    pub module: &'a [u8],
    pub sub_kind: SubKind,
    /// Raw bytes after the sub-kind byte.
    pub hash: &'a [u8],
}

impl<'a> KeeperKey<'a> {
    /// Split `s/k:{module}/{sub_kind}{hash}`.
    ///
    /// The module name runs from index 4 to the first `/`. Fails when there
    /// is no such separator or nothing follows it.
    pub fn parse(key: &'a [u8]) -> Result<Self, KeyGrammarError> {
        let tail = key.get(MODULE_START..).unwrap_or_default();
        let sep = tail
            .iter()
            .position(|&b| b == b'/')
            .ok_or_else(|| KeyGrammarError::MissingSeparator { key: to_hex(key) })?;

        let module = &tail[..sep];
        let after = &tail[sep + 1..];
        let (&kind, hash) = after
            .split_first()
            .ok_or_else(|| KeyGrammarError::MissingSubKind { key: to_hex(key) })?;

        Ok(Self {
            module,
            sub_kind: SubKind::from_byte(kind),
            hash,
        })
    }

    pub fn hash_hex(&self) -> String {
        to_hex(self.hash)
    }

    /// Write the `{module}:{label}:{HASH}` header line, module bytes as-is.
    pub fn write_header<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.module)?;
        writeln!(out, ":{}:{}", self.sub_kind, self.hash_hex())
    }
}

impl fmt::Display for KeeperKey<'_> {
    /// Lossy `{module}:{label}:{HASH}`, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            String::from_utf8_lossy(self.module),
            self.sub_kind,
            self.hash_hex()
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A keeper key that does not follow `s/k:{module}/{sub_kind}{hash}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyGrammarError {
    #[error("invalid keeper key: {key}: no '/' after module name")]
    MissingSeparator { key: String },
    #[error("invalid keeper key: {key}: no sub-kind byte after '/'")]
    MissingSubKind { key: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_third_byte() {
        assert_eq!(RecordKind::classify(b"s/latest"), RecordKind::Version);
        assert_eq!(RecordKind::classify(b"s/k:bank/r"), RecordKind::Keeper);
        assert_eq!(RecordKind::classify(b"s/100"), RecordKind::Block);
        assert_eq!(RecordKind::classify(b"xxl"), RecordKind::Version);
        assert_eq!(RecordKind::classify(b"s/"), RecordKind::Block);
        assert_eq!(RecordKind::classify(b""), RecordKind::Block);
    }

    #[test]
    fn height_text() {
        assert_eq!(block_height(b"s/100"), b"100");
        assert_eq!(block_height(b"s/"), b"");
        assert_eq!(block_height(b"s"), b"");
        assert_eq!(block_height(b"s/\xFF1"), b"\xFF1");
    }

    #[test]
    fn parse_node_key() {
        let key = b"s/k:bank/n\x01\xAB\xff";
        let parsed = KeeperKey::parse(key).unwrap();
        assert_eq!(parsed.module, b"bank");
        assert_eq!(parsed.sub_kind, SubKind::Node);
        assert_eq!(parsed.hash, &[0x01u8, 0xAB, 0xFF][..]);
        assert_eq!(parsed.hash_hex(), "01ABFF");
        assert_eq!(parsed.to_string(), "bank:node:01ABFF");
    }

    #[test]
    fn header_keeps_raw_module_bytes() {
        let parsed = KeeperKey::parse(b"s/k:a\xFFb/r\x0A").unwrap();
        let mut out = Vec::new();
        parsed.write_header(&mut out).unwrap();
        assert_eq!(out, b"a\xFFb:root:0A\n");
        assert_eq!(parsed.to_string(), "a\u{FFFD}b:root:0A");
    }

    #[test]
    fn sub_kind_labels() {
        let label = |k: &[u8]| KeeperKey::parse(k).unwrap().sub_kind.label();
        assert_eq!(label(b"s/k:acc/r"), "root");
        assert_eq!(label(b"s/k:acc/n"), "node");
        assert_eq!(label(b"s/k:acc/o"), "oooo");
        assert_eq!(label(b"s/k:acc/x"), "");
        assert_eq!(
            KeeperKey::parse(b"s/k:acc/x\x10").unwrap().to_string(),
            "acc::10"
        );
    }

    #[test]
    fn separator_search_starts_at_module() {
        // The `/` at index 1 is not the module separator.
        let parsed = KeeperKey::parse(b"s/k:/r").unwrap();
        assert!(parsed.module.is_empty());
        assert_eq!(parsed.sub_kind, SubKind::Root);
        assert!(parsed.hash.is_empty());

        // Hash bytes may themselves contain '/'.
        let parsed = KeeperKey::parse(b"s/k:gov/n//").unwrap();
        assert_eq!(parsed.module, b"gov");
        assert_eq!(parsed.hash, b"//");
    }

    #[test]
    fn missing_separator_is_an_error() {
        assert_eq!(
            KeeperKey::parse(b"s/k:bank"),
            Err(KeyGrammarError::MissingSeparator {
                key: to_hex(b"s/k:bank")
            })
        );
        assert!(matches!(
            KeeperKey::parse(b"s/k"),
            Err(KeyGrammarError::MissingSeparator { .. })
        ));
    }

    #[test]
    fn missing_sub_kind_is_an_error() {
        assert!(matches!(
            KeeperKey::parse(b"s/k:bank/"),
            Err(KeyGrammarError::MissingSubKind { .. })
        ));
    }
}
