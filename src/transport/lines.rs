//! Typed framing for the daemon's newline-delimited JSON streams (events,
//! stats). Raw log and archive streams pass through untouched; only the
//! endpoints that speak ndjson get a typed view.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use futures::Stream;
use serde::de::DeserializeOwned;

use super::ByteStream;
use crate::error::Error;

/// A live stream of `T`, one JSON document per line.
#[pin_project::pin_project]
pub struct JsonLines<T> {
    #[pin]
    inner: ByteStream,
    buf: BytesMut,
    ended: bool,
    _marker: PhantomData<T>,
}

impl<T> JsonLines<T> {
    pub fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            ended: false,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Stream for JsonLines<T> {
    type Item = Result<T, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Emit any complete line already buffered, skipping blank ones.
            while let Some(pos) = this.buf.iter().position(|b| *b == b'\n') {
                let line = this.buf.split_to(pos + 1);
                let line = &line[..line.len() - 1];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                if line.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Poll::Ready(Some(
                        serde_json::from_slice::<T>(line).map_err(Error::from),
                    ));
                }
            }

            if *this.ended {
                if this.buf.is_empty() {
                    return Poll::Ready(None);
                }
                // Final document without a trailing newline.
                let rest = this.buf.split();
                if rest.iter().all(|b| b.is_ascii_whitespace()) {
                    return Poll::Ready(None);
                }
                return Poll::Ready(Some(
                    serde_json::from_slice::<T>(&rest).map_err(Error::from),
                ));
            }

            match futures::ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => *this.ended = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::JsonLines;
    use bytes::Bytes;
    use futures::{executor::block_on, StreamExt};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        n: u32,
    }

    fn lines_over(chunks: Vec<&'static [u8]>) -> JsonLines<Doc> {
        let inner = futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c))));
        JsonLines::new(inner.boxed())
    }

    #[test]
    fn reassembles_documents_split_across_chunks() {
        let stream = lines_over(vec![b"{\"n\":", b"1}\n{\"n\":2}\n"]);
        let docs: Vec<_> = block_on(stream.collect::<Vec<_>>())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(docs, vec![Doc { n: 1 }, Doc { n: 2 }]);
    }

    #[test]
    fn trailing_document_without_newline_is_emitted() {
        let stream = lines_over(vec![b"{\"n\":1}\n{\"n\":2}"]);
        let docs: Vec<_> = block_on(stream.collect::<Vec<_>>())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(docs, vec![Doc { n: 1 }, Doc { n: 2 }]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let stream = lines_over(vec![b"\r\n{\"n\":7}\n\n"]);
        let docs: Vec<_> = block_on(stream.collect::<Vec<_>>())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(docs, vec![Doc { n: 7 }]);
    }
}
