use std::task::Poll;

use bytes::Bytes;
use futures::Stream;

use super::model::StatsSample;
use super::options::{AttachOptions, LogsOptions, StatsOptions};
use super::Container;
use crate::error::Error;
use crate::transport::{tables, ByteStream, Call, JsonLines};

impl Container {
    /// Follow the container's output. The stream stays open as long as the
    /// caller holds it (and, with `follow`, the container runs).
    pub async fn logs(&self, opts: &LogsOptions) -> Result<LogStream, Error> {
        let call = Call::get(
            format!("/containers/{}/logs", self.id),
            tables::container_logs(),
        )
        .queries(opts.to_query());
        Ok(LogStream::new(self.remote.stream(call).await?))
    }

    /// Resource usage samples, one JSON document per line.
    pub async fn stats(&self, opts: &StatsOptions) -> Result<JsonLines<StatsSample>, Error> {
        let call = Call::get(
            format!("/containers/{}/stats", self.id),
            tables::container_stats(),
        )
        .queries(opts.to_query());
        Ok(JsonLines::new(self.remote.stream(call).await?))
    }

    /// Attach to the container's output. An input stream, when given, is
    /// forwarded over the hijacked connection as stdin.
    pub async fn attach(
        &self,
        opts: &AttachOptions,
        input: Option<ByteStream>,
    ) -> Result<LogStream, Error> {
        let mut call = Call::post(
            format!("/containers/{}/attach", self.id),
            tables::container_attach(),
        )
        .queries(opts.to_query());
        if let Some(input) = input {
            call = call.upload(input);
        }
        Ok(LogStream::new(self.remote.stream(call).await?))
    }

    /// Stream the container's filesystem as a tar archive.
    pub async fn export(&self) -> Result<ByteStream, Error> {
        let call = Call::get(
            format!("/containers/{}/export", self.id),
            tables::container_export(),
        );
        self.remote.stream(call).await
    }

    /// Buffer the whole exported archive in memory and return it as text.
    /// Memory use is unbounded by the archive size; [`export`](Self::export)
    /// streams instead.
    pub async fn export_buffered(&self) -> Result<String, Error> {
        let call = Call::get(
            format!("/containers/{}/export", self.id),
            tables::container_export(),
        );
        self.remote.text(call).await
    }
}

/// Forwards one container output stream, ending it on the first transport
/// failure.
#[pin_project::pin_project]
pub struct LogStream {
    #[pin]
    stream: ByteStream,
}

impl LogStream {
    pub(crate) fn new(stream: ByteStream) -> Self {
        Self { stream }
    }
}

impl Stream for LogStream {
    type Item = Bytes;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.project();
        match futures::ready!(this.stream.poll_next(cx)) {
            Some(Ok(buf)) => Poll::Ready(Some(buf)),
            Some(Err(e)) => {
                tracing::warn!("Output stream closing due to failure: {e}");
                Poll::Ready(None)
            }
            None => Poll::Ready(None),
        }
    }
}
