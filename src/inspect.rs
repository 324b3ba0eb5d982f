// Full-store scan: iterate every record and render it in key order.
//
// The scan is strictly sequential. Each record is classified and printed
// before the next one is read, and the first fatal error ends the run.

use std::io::{self, Write};

use crate::codec::DecodeError;
use crate::record::key::KeyGrammarError;
use crate::record::render::RecordRenderer;
use crate::store::{RecordSource, StoreError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters collected over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    /// Records read from the store.
    pub records: u64,
    /// `s/latest` records.
    pub versions: u64,
    /// `s/{height}` records.
    pub blocks: u64,
    /// `s/k:...` records of any sub-kind.
    pub keeper_records: u64,
    /// Tree nodes decoded and printed.
    pub nodes: u64,
    /// Module root hashes printed.
    pub roots: u64,
    /// Tree nodes that failed to decode and were skipped.
    pub node_errors: u64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Conditions that stop a scan.
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    KeyGrammar(#[from] KeyGrammarError),
    /// A version or block value did not decode.
    #[error("record {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("write error: {0}")]
    Io(#[from] io::Error),
}

impl DumpError {
    pub(crate) fn decode(key: &[u8], source: DecodeError) -> Self {
        Self::Decode {
            key: String::from_utf8_lossy(key).into_owned(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

/// Render every record of `source` to `out`.
///
/// Output already written stays written when a later record fails.
pub fn dump<S, W>(source: &mut S, out: W) -> Result<DumpStats, DumpError>
where
    S: RecordSource + ?Sized,
    W: Write,
{
    let mut renderer = RecordRenderer::new(out);
    for record in source.records()? {
        let record = record?;
        renderer.render(&record.key, &record.value)?;
    }
    let stats = renderer.finish()?;
    log::info!(
        "scanned {} records ({} blocks, {} nodes, {} roots, {} skipped nodes)",
        stats.records,
        stats.blocks,
        stats.nodes,
        stats.roots,
        stats.node_errors
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
