//! Filesystem archive access for one container.

use super::options::PutArchiveOptions;
use crate::error::Error;
use crate::transport::{tables, ByteStream, Call, Remote};

/// Moves tar archives in and out of a container's filesystem.
#[derive(Debug, Clone)]
pub struct ContainerFs {
    remote: Remote,
    container: String,
}

impl ContainerFs {
    pub(crate) fn new(remote: Remote, container: String) -> Self {
        Self { remote, container }
    }

    pub fn container_id(&self) -> &str {
        &self.container
    }

    /// Stream a tar archive of the given path out of the container.
    pub async fn get(&self, path: &str) -> Result<ByteStream, Error> {
        let call = Call::get(
            format!("/containers/{}/archive", self.container),
            tables::archive_get(),
        )
        .query("path", path);
        self.remote.stream(call).await
    }

    /// Upload a tar archive, extracting it at the configured path. The
    /// archive bytes are forwarded as the request stream, unbuffered.
    pub async fn put(&self, opts: &PutArchiveOptions, archive: ByteStream) -> Result<(), Error> {
        let call = Call::put(
            format!("/containers/{}/archive", self.container),
            tables::archive_put(),
        )
        .queries(opts.to_query())
        .upload(archive);
        self.remote.unit(call).await
    }

    /// Stat a path inside the container. Resolves with the raw metadata
    /// header value: a base64-encoded JSON document.
    pub async fn info(&self, path: &str) -> Result<String, Error> {
        let call = Call::head(
            format!("/containers/{}/archive", self.container),
            tables::archive_info(),
        )
        .query("path", path);
        self.remote.text(call).await
    }
}
