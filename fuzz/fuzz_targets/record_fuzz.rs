#![no_main]
use iavldump::record::RecordRenderer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks where the key ends; the rest is the value.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = (split as usize).min(rest.len());
    let (key, value) = rest.split_at(split);

    let mut renderer = RecordRenderer::new(std::io::sink());
    let _ = renderer.render(key, value);
});
