#![no_main]
use libfuzzer_sys::fuzz_target;
use zlzw::{encode::Encoder, Framing};

fuzz_target!(|data: &[u8]| {
    for &framing in &[Framing::Uniform, Framing::Legacy] {
        let mut encoder = Encoder::with_framing(framing);
        let mut buffer = Vec::with_capacity(2*data.len() + 16);
        let result = encoder.into_stream(&mut buffer).encode_all(data);
        assert!(result.status.is_ok(), "{:?}", result.status);
        assert_eq!(&buffer[..3], &[0x1f, 0x9d, 0x89]);

        let bits = (buffer.len() - 3) * 8;
        match framing {
            Framing::Uniform => assert_eq!(bits % 9, 0),
            Framing::Legacy if data.is_empty() => assert_eq!(bits, 0),
            Framing::Legacy => assert_eq!((bits - 8) % 9, 0),
        }
        assert!(encoder.dictionary().len() <= 255);
    }
});
