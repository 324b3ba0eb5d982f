// Uppercase hexadecimal rendering for hashes and raw keys.

/// Two uppercase hex digits per byte, no separators, no prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}
