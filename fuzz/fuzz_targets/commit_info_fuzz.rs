#![no_main]
use iavldump::codec::{self, CommitInfo};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = CommitInfo::decode(data);
    let _ = codec::decode_latest_version(data);
});
