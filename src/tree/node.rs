// Single-node decoder for the versioned Merkle tree.
//
// Node layout, in order:
//
//   height  int8        0 = leaf, anything else = branch
//   size    varint      leaves in this subtree
//   version varint      tree version that wrote the node
//   key     byte slice
//   leaf:   value       byte slice
//   branch: left hash   byte slice
//           right hash  byte slice
//
// Child hashes are kept as opaque bytes. Nothing here loads children.

use std::io::{self, Write};

use crate::codec::primitive::{self, DecodeError, Reader};
use crate::codec::varint;
use crate::hexfmt::to_hex;

/// Placeholder printed when a node has no displayable value.
pub const NOT_APPLICABLE: &str = "n/a";

/// Payload that depends on whether the node is a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    Leaf { value: Vec<u8> },
    Branch { left_hash: Vec<u8>, right_hash: Vec<u8> },
}

/// One decoded tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub height: i8,
    pub size: i64,
    pub version: i64,
    pub key: Vec<u8>,
    pub body: NodeBody,
}

impl TreeNode {
    /// Decode one node from the start of `buf`.
    ///
    /// Either every field decodes or the first failing field is reported;
    /// there is no partial result. Bytes after the last field are ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut r = Reader::new(buf);

        let height = r.int8("node.height")?;
        let size = r.varint("node.size")?;
        let version = r.varint("node.version")?;
        let key = r.byte_slice("node.key")?.to_vec();

        let body = if height == 0 {
            NodeBody::Leaf {
                value: r.byte_slice("node.value")?.to_vec(),
            }
        } else {
            let left_hash = r.byte_slice("node.leftHash")?.to_vec();
            let right_hash = r.byte_slice("node.rightHash")?.to_vec();
            NodeBody::Branch {
                left_hash,
                right_hash,
            }
        };

        Ok(Self {
            height,
            size,
            version,
            key,
            body,
        })
    }

    /// Encode the node in the layout [`TreeNode::decode`] reads.
    ///
    /// The body variant is written as-is; callers keep `height` consistent
    /// with it.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len_hint());
        out.push(self.height as u8);
        varint::write_u64(&mut out, self.size as u64);
        varint::write_u64(&mut out, self.version as u64);
        primitive::encode_byte_slice(&mut out, &self.key);
        match &self.body {
            NodeBody::Leaf { value } => primitive::encode_byte_slice(&mut out, value),
            NodeBody::Branch {
                left_hash,
                right_hash,
            } => {
                primitive::encode_byte_slice(&mut out, left_hash);
                primitive::encode_byte_slice(&mut out, right_hash);
            }
        }
        out
    }

    fn encoded_len_hint(&self) -> usize {
        let body = match &self.body {
            NodeBody::Leaf { value } => value.len(),
            NodeBody::Branch {
                left_hash,
                right_hash,
            } => left_hash.len() + right_hash.len(),
        };
        1 + 5 * varint::MAX_VARINT_LEN + self.key.len() + body
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.height == 0
    }

    pub fn value(&self) -> Option<&[u8]> {
        match &self.body {
            NodeBody::Leaf { value } => Some(value.as_slice()),
            NodeBody::Branch { .. } => None,
        }
    }

    pub fn left_hash(&self) -> Option<&[u8]> {
        match &self.body {
            NodeBody::Leaf { .. } => None,
            NodeBody::Branch { left_hash, .. } => Some(left_hash.as_slice()),
        }
    }

    pub fn right_hash(&self) -> Option<&[u8]> {
        match &self.body {
            NodeBody::Leaf { .. } => None,
            NodeBody::Branch { right_hash, .. } => Some(right_hash.as_slice()),
        }
    }

    /// Value as printed: raw bytes when the first byte is non-zero, else
    /// `n/a`.
    ///
    /// Branches and empty values are `n/a` as well.
    pub fn display_value(&self) -> &[u8] {
        match self.value() {
            Some(value) if value.first().is_some_and(|&b| b != 0) => value,
            _ => NOT_APPLICABLE.as_bytes(),
        }
    }

    /// Write the seven labelled lines, each newline-terminated.
    ///
    /// Key and value bytes go out verbatim, UTF-8 or not.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "  height    : {}", self.height)?;
        writeln!(out, "  size      : {}", self.size)?;
        writeln!(out, "  version   : {}", self.version)?;
        out.write_all(b"  key       : ")?;
        out.write_all(&self.key)?;
        out.write_all(b"\n")?;
        writeln!(out, "  left  hash: {}", to_hex(self.left_hash().unwrap_or_default()))?;
        writeln!(out, "  right hash: {}", to_hex(self.right_hash().unwrap_or_default()))?;
        out.write_all(b"  value     : ")?;
        out.write_all(self.display_value())?;
        out.write_all(b"\n")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(value: &[u8]) -> TreeNode {
        TreeNode {
            height: 0,
            size: 1,
            version: 5,
            key: b"abc".to_vec(),
            body: NodeBody::Leaf {
                value: value.to_vec(),
            },
        }
    }

    fn branch() -> TreeNode {
        TreeNode {
            height: 3,
            size: 6,
            version: 12,
            key: b"m".to_vec(),
            body: NodeBody::Branch {
                left_hash: vec![0x01, 0x02],
                right_hash: vec![0xAA; 32],
            },
        }
    }

    #[test]
    fn leaf_known_bytes() {
        let bytes = [0x00, 0x01, 0x05, 0x03, b'a', b'b', b'c', 0x03, b'x', b'y', b'z'];
        let node = TreeNode::decode(&bytes).unwrap();
        assert_eq!(node, leaf(b"xyz"));
        assert!(node.is_leaf());
        assert_eq!(node.value(), Some(&b"xyz"[..]));
        assert_eq!(node.left_hash(), None);
        assert_eq!(node.encode(), bytes);
    }

    #[test]
    fn branch_roundtrip() {
        let node = branch();
        let decoded = TreeNode::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert!(!decoded.is_leaf());
        assert_eq!(decoded.value(), None);
        assert_eq!(decoded.right_hash(), Some(&[0xAA; 32][..]));
    }

    #[test]
    fn negative_height_is_a_branch() {
        let mut node = branch();
        node.height = -1;
        let decoded = TreeNode::decode(&node.encode()).unwrap();
        assert_eq!(decoded.height, -1);
        assert!(matches!(decoded.body, NodeBody::Branch { .. }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut bytes = leaf(b"v").encode();
        bytes.extend_from_slice(&[0xFF, 0xFF]);
        assert_eq!(TreeNode::decode(&bytes).unwrap(), leaf(b"v"));
    }

    #[test]
    fn truncation_names_failing_field() {
        let full = branch().encode();
        let expect = [
            (0, "node.height"),
            (1, "node.size"),
            (2, "node.version"),
            (3, "node.key"),
            (5, "node.leftHash"),
            (full.len() - 1, "node.rightHash"),
        ];
        for (len, field) in expect {
            let err = TreeNode::decode(&full[..len]).unwrap_err();
            assert_eq!(err.field(), field, "truncated at {len}");
        }

        let leaf_bytes = leaf(b"xyz").encode();
        let err = TreeNode::decode(&leaf_bytes[..leaf_bytes.len() - 1]).unwrap_err();
        assert_eq!(err.field(), "node.value");
    }

    fn render(node: &TreeNode) -> Vec<u8> {
        let mut out = Vec::new();
        node.write_to(&mut out).unwrap();
        out
    }

    #[test]
    fn display_value_heuristic() {
        let na = NOT_APPLICABLE.as_bytes();
        assert_eq!(leaf(b"xyz").display_value(), b"xyz");
        assert_eq!(leaf(b"\x00xyz").display_value(), na);
        assert_eq!(leaf(b"").display_value(), na);
        assert_eq!(branch().display_value(), na);
    }

    #[test]
    fn non_utf8_key_and_value_are_written_verbatim() {
        let mut node = leaf(&[b'a', 0xFF, 0x00]);
        node.key = vec![0x01, 0xC3];
        let out = render(&node);
        assert!(out.windows(16).any(|w| w == b"  key       : \x01\xC3"));
        assert!(out.ends_with(b"  value     : a\xFF\x00\n"));
    }

    #[test]
    fn display_leaf() {
        let text = String::from_utf8(render(&leaf(b"xyz"))).unwrap();
        assert_eq!(
            text,
            "  height    : 0\n\
             \x20 size      : 1\n\
             \x20 version   : 5\n\
             \x20 key       : abc\n\
             \x20 left  hash: \n\
             \x20 right hash: \n\
             \x20 value     : xyz\n"
        );
    }

    #[test]
    fn display_branch() {
        let text = String::from_utf8(render(&branch())).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "  height    : 3");
        assert_eq!(lines[4], "  left  hash: 0102");
        assert_eq!(lines[5], format!("  right hash: {}", "AA".repeat(32)));
        assert_eq!(lines[6], "  value     : n/a");
    }
}
