// Store records: key classification and rendering.
//
// - `key`   : RecordKind / KeeperKey: the key grammar
// - `render`: RecordRenderer: per-kind decode and print

pub mod key;
pub mod render;

pub use key::{KeeperKey, KeyGrammarError, RecordKind, SubKind};
pub use render::{RecordRenderer, RenderOutcome};
