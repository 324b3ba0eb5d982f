// Record renderer: classify one (key, value) pair and print it.
//
// Output per kind:
//
//   version  "{key}: {latest}"
//   block    "Block:  {height}" then "  {store:<15}: {HASH}" per sub-store
//   keeper   "{module}:{label}:{HASH}", then
//              node -> the seven node lines and a blank line
//              root -> "  root hash : {HASH}" and a blank line
//
// Version and block decode failures are fatal. A node that fails to decode
// is logged and skipped; its header line has already been written.

use std::io::Write;

use super::key::{KeeperKey, RecordKind, SubKind, block_height};
use crate::codec::{CommitInfo, DecodeError, decode_latest_version};
use crate::hexfmt::to_hex;
use crate::inspect::{DumpError, DumpStats};
use crate::tree::TreeNode;

/// Column width the sub-store name is padded to in block listings.
pub const STORE_NAME_WIDTH: usize = 15;

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Version(i64),
    Block { stores: usize },
    Keeper(SubKind),
    /// Keeper node whose value could not be decoded. Only the header line
    /// was printed.
    NodeSkipped(DecodeError),
}

/// Writes rendered records to `out` and tallies them.
#[derive(Debug)]
pub struct RecordRenderer<W: Write> {
    out: W,
    stats: DumpStats,
}

impl<W: Write> RecordRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: DumpStats::default(),
        }
    }

    pub fn stats(&self) -> &DumpStats {
        &self.stats
    }

    /// Render one record. Only fatal conditions are returned as errors.
    pub fn render(&mut self, key: &[u8], value: &[u8]) -> Result<RenderOutcome, DumpError> {
        self.stats.records += 1;
        let kind = RecordKind::classify(key);
        log::debug!("record {} classified as {kind:?}", to_hex(key));
        match kind {
            RecordKind::Version => self.render_version(key, value),
            RecordKind::Block => self.render_block(key, value),
            RecordKind::Keeper => self.render_keeper(key, value),
        }
    }

    fn render_version(&mut self, key: &[u8], value: &[u8]) -> Result<RenderOutcome, DumpError> {
        let latest = decode_latest_version(value).map_err(|e| DumpError::decode(key, e))?;
        self.out.write_all(key)?;
        writeln!(self.out, ": {latest}")?;
        self.stats.versions += 1;
        Ok(RenderOutcome::Version(latest))
    }

    fn render_block(&mut self, key: &[u8], value: &[u8]) -> Result<RenderOutcome, DumpError> {
        let info = CommitInfo::decode(value).map_err(|e| DumpError::decode(key, e))?;
        // Two spaces: the header label and height are separate fields.
        self.out.write_all(b"Block:  ")?;
        self.out.write_all(block_height(key))?;
        self.out.write_all(b"\n")?;
        for store in &info.store_infos {
            writeln!(
                self.out,
                "  {:<width$}: {}",
                store.name,
                to_hex(&store.commit_id.hash),
                width = STORE_NAME_WIDTH
            )?;
        }
        self.stats.blocks += 1;
        Ok(RenderOutcome::Block {
            stores: info.store_infos.len(),
        })
    }

    fn render_keeper(&mut self, key: &[u8], value: &[u8]) -> Result<RenderOutcome, DumpError> {
        let keeper = KeeperKey::parse(key)?;
        keeper.write_header(&mut self.out)?;
        self.stats.keeper_records += 1;

        match keeper.sub_kind {
            SubKind::Node => match TreeNode::decode(value) {
                Ok(node) => {
                    node.write_to(&mut self.out)?;
                    writeln!(self.out)?;
                    self.stats.nodes += 1;
                }
                Err(e) => {
                    log::warn!("{keeper}: {e}");
                    self.stats.node_errors += 1;
                    return Ok(RenderOutcome::NodeSkipped(e));
                }
            },
            SubKind::Root => {
                writeln!(self.out, "  root hash : {}", to_hex(value))?;
                writeln!(self.out)?;
                self.stats.roots += 1;
            }
            SubKind::Legacy | SubKind::Unlabeled(_) => {}
        }
        Ok(RenderOutcome::Keeper(keeper.sub_kind))
    }

    /// Flush the writer and hand back the tallies.
    pub fn finish(mut self) -> Result<DumpStats, DumpError> {
        self.out.flush()?;
        Ok(self.stats)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
