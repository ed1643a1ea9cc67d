use std::path::PathBuf;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::errors::{Error, Result};

/// Where asset bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Http(Url),
    File(PathBuf),
}

impl AssetSource {
    /// `http(s)://` goes over the network, `file://` and bare paths read
    /// from disk.
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Ok(Self::Http(Url::parse(source)?))
        } else if source.starts_with("file://") {
            Url::parse(source)?
                .to_file_path()
                .map(Self::File)
                .map_err(|()| Error::AssetNotFound(source.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(source)))
        }
    }

    /// Last path segment, for labels and logs.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Http(url) => url
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .unwrap_or(url.as_str())
                .to_string(),
            Self::File(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        }
    }

    /// Reads the bytes in the background and hands them to `on_done` on the
    /// worker that finished the read.
    ///
    /// If the file runtime cannot be started, `on_done` runs immediately
    /// with the error.
    pub fn fetch(self, on_done: impl FnOnce(Result<Vec<u8>>) + Send + 'static) {
        match self {
            Self::Http(url) => {
                let request = ehttp::Request::get(url.as_str());
                ehttp::fetch(request, move |response| {
                    on_done(read_response(response));
                });
            }
            Self::File(path) => match file_runtime() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        on_done(tokio::fs::read(&path).await.map_err(Error::from));
                    });
                }
                Err(e) => on_done(Err(e.into())),
            },
        }
    }
}

/// Shared runtime for disk reads, started on first use.
fn file_runtime() -> std::io::Result<&'static Runtime> {
    static RUNTIME: OnceLock<std::io::Result<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| Builder::new_multi_thread().thread_name("asset-io").build())
        .as_ref()
        .map_err(|e| std::io::Error::new(e.kind(), e.to_string()))
}

fn read_response(response: ehttp::Result<ehttp::Response>) -> Result<Vec<u8>> {
    let response = response.map_err(Error::HttpError)?;
    if !response.ok {
        return Err(Error::HttpResponseError {
            status: response.status,
            url: response.url,
        });
    }
    Ok(response.bytes)
}
