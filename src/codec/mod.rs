// Binary codecs for the store's on-disk values.
//
// # Modules
//
// - `varint`   : Variable-length integer encoding (base-128, little-endian)
// - `primitive`: Field-tagged int8 / varint / byte-slice decoders and a cursor
// - `amino`    : Length-prefixed structured values (latest version, commit info)

pub mod amino;
pub mod primitive;
pub mod varint;

// Re-export key types for convenience.
pub use amino::{CommitId, CommitInfo, StoreInfo, decode_latest_version, encode_latest_version};
pub use primitive::{
    DecodeError, Reader, decode_byte_slice, decode_int8, decode_uvarint, decode_varint,
    encode_byte_slice,
};
pub use varint::VarIntError;
