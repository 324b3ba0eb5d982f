// Versioned Merkle tree nodes as persisted by the store.
//
// - `node`: TreeNode: single-node decode/encode and the printed layout

pub mod node;

pub use node::{NOT_APPLICABLE, NodeBody, TreeNode};
