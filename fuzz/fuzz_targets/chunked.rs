#![no_main]
use libfuzzer_sys::fuzz_target;
use zlzw::{encode::Encoder, encode_to_vec, LzwStatus};

fuzz_target!(|raw_data: &[u8]| {
    // The first byte picks the buffer sizes.
    let (sizes, data) = match raw_data.split_first() {
        Some((&sizes, data)) => (sizes, data),
        None => return,
    };
    let in_size = usize::from(sizes & 0xf) + 1;
    let out_size = usize::from(sizes >> 4) + 1;

    let mut encoder = Encoder::new();
    let mut output = vec![];
    let mut target = vec![0; out_size];
    let mut rest = data;
    loop {
        if rest.is_empty() {
            encoder.finish();
        }
        let take = rest.len().min(in_size);
        let result = encoder.encode_bytes(&rest[..take], &mut target);
        output.extend_from_slice(&target[..result.consumed_out]);
        rest = &rest[result.consumed_in..];
        match result.status {
            LzwStatus::Done => break,
            LzwStatus::NoProgress => panic!("stalled with {} bytes left", rest.len()),
            LzwStatus::Ok => {}
        }
    }

    assert_eq!(output, encode_to_vec(data));
});
