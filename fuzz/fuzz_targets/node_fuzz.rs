#![no_main]
use iavldump::tree::TreeNode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail, never panic.
    if let Ok(node) = TreeNode::decode(data) {
        let _ = node.write_to(&mut std::io::sink());
        // Canonical re-encoding decodes to the same node.
        assert_eq!(TreeNode::decode(&node.encode()).ok(), Some(node));
    }
});
