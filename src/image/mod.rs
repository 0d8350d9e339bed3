//! Image handles. Images are addressed by name-or-id interchangeably, the
//! way the daemon resolves them.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::transport::{tables, Call, Remote};

/// Collection-level image operations.
#[derive(Debug, Clone)]
pub struct Images {
    remote: Remote,
}

impl Images {
    pub(crate) fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// List images, one handle per entry, in the daemon's order.
    pub async fn list(&self, opts: &ListImagesOptions) -> Result<Vec<Image>, Error> {
        let call = Call::get("/images/json", tables::image_list())
            .queries(opts.to_query())
            .filters(&opts.filters)?;
        let entries: Vec<Value> = self.remote.value(call).await?;

        entries
            .into_iter()
            .map(|entry| {
                let id = entry
                    .get("Id")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| Error::transport("image list entry without an Id"))?;
                Ok(Image {
                    remote: self.remote.clone(),
                    id,
                    snapshot: Some(entry),
                })
            })
            .collect()
    }

    /// Wrap a known image name or id without touching the daemon.
    pub fn get(&self, name: impl Into<String>) -> Image {
        Image {
            remote: self.remote.clone(),
            id: name.into(),
            snapshot: None,
        }
    }
}

/// Handle to one image.
#[derive(Debug, Clone)]
pub struct Image {
    remote: Remote,
    id: String,
    snapshot: Option<Value>,
}

impl Image {
    pub(crate) fn from_parts(remote: Remote, id: String, snapshot: Option<Value>) -> Self {
        Self {
            remote,
            id,
            snapshot,
        }
    }

    /// The name or id this handle addresses the image by.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> Option<&Value> {
        self.snapshot.as_ref()
    }

    /// Fetch the image's representation, replacing the snapshot.
    pub async fn inspect(&mut self) -> Result<ImageDetails, Error> {
        let call = Call::get(format!("/images/{}/json", self.id), tables::image_inspect());
        let body = self.remote.raw(call).await?;
        let details = serde_json::from_value(body.clone())?;
        self.snapshot = Some(body);
        Ok(details)
    }

    /// Layer history, most recent first as the daemon reports it.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, Error> {
        let call = Call::get(
            format!("/images/{}/history", self.id),
            tables::image_history(),
        );
        self.remote.value(call).await
    }

    /// Remove the image. Resolves with the untag/delete records the daemon
    /// reports.
    pub async fn remove(&self, opts: &RemoveImageOptions) -> Result<Vec<DeleteRecord>, Error> {
        tracing::trace!("Removing image {}", self.id);
        let call = Call::delete(format!("/images/{}", self.id), tables::image_remove())
            .queries(opts.to_query());
        self.remote.value(call).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListImagesOptions {
    /// Include intermediate layers.
    pub all: bool,
    /// Include digest information.
    pub digests: bool,
    pub filters: HashMap<String, Vec<String>>,
}

impl ListImagesOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.all {
            query.push(("all", "true".to_string()));
        }
        if self.digests {
            query.push(("digests", "true".to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveImageOptions {
    /// Remove even when containers reference the image.
    pub force: bool,
    /// Keep untagged parent layers.
    pub noprune: bool,
}

impl RemoveImageOptions {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if self.force {
            query.push(("force", "true".to_string()));
        }
        if self.noprune {
            query.push(("noprune", "true".to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageSummary {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub created: i64,
    pub size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageDetails {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub created: String,
    pub os: String,
    pub architecture: String,
    pub size: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HistoryEntry {
    pub id: String,
    pub created: i64,
    pub created_by: String,
    pub size: i64,
    pub tags: Vec<String>,
}

/// One record of an image removal: each layer is either untagged or
/// deleted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeleteRecord {
    pub untagged: Option<String>,
    pub deleted: Option<String>,
}
