use futures::io::BufReader;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;
use zlzw::{encode::Encoder, encode_to_vec};

#[tokio::test]
async fn async_matches_sync() {
    let data: Vec<u8> = b"to be or not to be, that is the question. "
        .iter()
        .copied()
        .cycle()
        .take(40_000)
        .collect();
    let expected = encode_to_vec(&data);

    let (mut tx, rx) = tokio::io::duplex(256);
    let feed = tokio::spawn(async move {
        tx.write_all(&data).await.unwrap();
        tx.shutdown().await.unwrap();
    });

    let mut encoder = Encoder::new();
    let mut output = vec![];
    let result = encoder
        .into_async(&mut output)
        .encode_all(BufReader::new(rx.compat()))
        .await;
    feed.await.unwrap();

    assert!(result.status.is_ok());
    assert_eq!(result.bytes_read, 40_000);
    assert_eq!(output, expected);
}

#[tokio::test]
async fn async_empty_input() {
    let mut encoder = Encoder::new();
    let mut output = vec![];
    let result = encoder.into_async(&mut output).encode_all(&b""[..]).await;
    assert!(result.status.is_ok());
    assert_eq!(output, [0x1f, 0x9d, 0x89]);
}
