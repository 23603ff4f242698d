//! JSON-lines byte view of an `ApexStream`

use futures_util::{StreamExt, stream};
use macrocosmos::SdkError;
use macrocosmos::proto::apex::{ChatCompletionChunkResponse, ChoiceDelta, ChunkChoice};
use macrocosmos::streaming::{AbortController, ApexStream};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::support::fake_source::fake_source;

fn chunk(id: &str, content: &str) -> ChatCompletionChunkResponse {
    ChatCompletionChunkResponse {
        id: id.to_string(),
        choices: vec![ChunkChoice {
            delta: Some(ChoiceDelta {
                content: content.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[tokio::test]
async fn each_item_becomes_one_json_line() {
    let mut stream = ApexStream::new(
        stream::iter(vec![Ok(json!({"x": 1}))]),
        AbortController::new(),
    );

    let chunks: Vec<_> = stream.byte_stream().unwrap().collect().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(&chunks[0].as_ref().unwrap()[..], b"{\"x\":1}\n");
}

#[tokio::test]
async fn two_items_become_two_chunks_then_the_stream_closes() {
    let items = vec![json!({"x": 1}), json!({"x": 2})];
    let mut stream = ApexStream::new(
        stream::iter(items.clone().into_iter().map(Ok)),
        AbortController::new(),
    );
    let mut bytes = stream.byte_stream().unwrap();

    for expected in &items {
        let chunk = bytes.next().await.unwrap().unwrap();
        assert_eq!(chunk.last(), Some(&b'\n'));
        let parsed: Value = serde_json::from_slice(&chunk).unwrap();
        assert_eq!(&parsed, expected);
    }
    assert!(bytes.next().await.is_none());
}

#[tokio::test]
async fn byte_stream_consumes_the_adapter() {
    let mut stream = ApexStream::new(stream::iter(vec![Ok(json!(1))]), AbortController::new());
    let _bytes = stream.byte_stream().unwrap();

    assert!(stream.stream().err().unwrap().is_stream_consumed());
    assert!(stream.byte_stream().is_err());
}

#[tokio::test]
async fn source_error_ends_the_byte_stream() {
    let (source, handle) = fake_source::<Value>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    handle.data(json!({"n": 1}));
    handle.error(SdkError::Source("socket closed".to_string()));
    handle.data(json!({"n": 2}));

    let chunks: Vec<_> = stream.byte_stream().unwrap().collect().await;
    assert_eq!(chunks.len(), 2);
    assert_eq!(&chunks[0].as_ref().unwrap()[..], b"{\"n\":1}\n");
    assert_eq!(
        chunks[1].as_ref().unwrap_err(),
        &SdkError::Source("socket closed".to_string())
    );
}

#[tokio::test]
async fn dropping_the_byte_stream_cancels_the_source() {
    let (source, handle) = fake_source::<Value>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    let mut bytes = stream.byte_stream().unwrap();

    handle.data(json!("first"));
    assert!(bytes.next().await.is_some());
    drop(bytes);

    assert_eq!(handle.cancel_count(), 1);
}

#[tokio::test]
async fn chat_chunks_can_be_piped_to_a_file() {
    let (source, handle) = fake_source::<ChatCompletionChunkResponse>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    handle.data(chunk("c1", "Can"));
    handle.data(chunk("c1", "berra"));
    handle.end();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chunks.jsonl");
    let mut file = tokio::fs::File::create(&path).await.unwrap();
    let mut reader = stream.byte_reader().unwrap();
    tokio::io::copy(&mut reader, &mut file).await.unwrap();
    file.flush().await.unwrap();
    drop(file);

    let mut written = String::new();
    tokio::fs::File::open(&path)
        .await
        .unwrap()
        .read_to_string(&mut written)
        .await
        .unwrap();

    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], "c1");
    assert_eq!(first["choices"][0]["delta"]["content"], "Can");
    let second: ChatCompletionChunkResponse = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.delta_text(), "berra");
    assert!(written.ends_with('\n'));
}
