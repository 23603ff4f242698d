//! JSON-lines byte encoding of item streams.

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use serde::Serialize;

use super::stream::ItemStream;
use crate::error::{Result, SdkError};

/// Pinned, boxed stream of encoded chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Encode one item as `<json>\n`.
pub fn encode_json_line<T: Serialize>(item: &T) -> Result<Bytes> {
    let mut line = serde_json::to_vec(item).map_err(SdkError::from)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// One chunk per item; the first error (upstream or serialization) is
/// yielded and ends the stream.
pub(crate) fn encode_json_lines<T>(items: ItemStream<T>) -> ByteStream
where
    T: Serialize + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut items = items;
        while let Some(item) = futures_util::StreamExt::next(&mut items).await {
            match item.and_then(|item| encode_json_line(&item)) {
                Ok(chunk) => yield Ok(chunk),
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    })
}
