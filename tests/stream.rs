use std::io::{self, Write};
use zlzw::{encode::Encoder, encode_to_vec, Framing, LzwStatus};

fn sample() -> Vec<u8> {
    let mut data = vec![];
    for round in 0..200u32 {
        data.extend_from_slice(b"the quick brown fox jumps over the lazy dog ");
        data.extend(round.to_le_bytes().iter());
    }
    data
}

fn encode_chunked(data: &[u8], in_size: usize, out_size: usize) -> Vec<u8> {
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
        assert_ne!(result.status, LzwStatus::NoProgress);
        output.extend_from_slice(&target[..result.consumed_out]);
        rest = &rest[result.consumed_in..];
        if result.status == LzwStatus::Done {
            break;
        }
    }
    output
}

#[test]
fn chunking_does_not_change_output() {
    let data = sample();
    let reference = encode_to_vec(&data);
    for &(in_size, out_size) in &[(1, 1), (1, 2), (3, 1), (7, 5), (64, 3), (4096, 4096)] {
        assert_eq!(
            encode_chunked(&data, in_size, out_size),
            reference,
            "in {} out {}",
            in_size,
            out_size
        );
    }
}

#[test]
fn stream_matches_vec() {
    let data = sample();
    let mut encoder = Encoder::new();
    let mut output = vec![];
    let result = encoder.into_stream(&mut output).encode_all(&data[..]);
    assert!(result.status.is_ok());
    assert_eq!(result.bytes_read, data.len());
    assert_eq!(result.bytes_written, output.len());
    assert_eq!(output, encode_to_vec(&data));
}

#[test]
fn encode_can_be_resumed() {
    let data = sample();
    let (head, tail) = data.split_at(data.len() / 3);

    let mut encoder = Encoder::new();
    let mut output = vec![];
    {
        let mut stream = encoder.into_stream(&mut output);
        assert!(stream.encode(head).status.is_ok());
    }
    assert!(!encoder.has_ended());
    assert!(encoder.into_stream(&mut output).encode_all(tail).status.is_ok());
    assert!(encoder.is_done());
    assert_eq!(output, encode_to_vec(&data));
}

#[test]
fn vec_encode_can_be_resumed() {
    let data = sample();
    let (head, tail) = data.split_at(1000);

    let mut encoder = Encoder::with_framing(Framing::Legacy);
    let mut output = vec![];
    let first = encoder.into_vec(&mut output).encode(head);
    assert_eq!(first.status, LzwStatus::Ok);
    assert_eq!(first.consumed_in, head.len());
    let second = encoder.into_vec(&mut output).encode_all(tail);
    assert_eq!(second.status, LzwStatus::Done);

    let mut oneshot = vec![];
    let result = Encoder::with_legacy_framing()
        .into_vec(&mut oneshot)
        .encode_all(&data);
    assert_eq!(result.status, LzwStatus::Done);
    assert_eq!(output, oneshot);
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_errors_are_reported() {
    let mut encoder = Encoder::new();
    let result = encoder.into_stream(Broken).encode_all(&b"some data"[..]);
    let err = result.status.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}
