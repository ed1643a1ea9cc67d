//! Asynchronous asset loads.
//!
//! Fetching and decoding run on a background thread; the result comes back
//! over a `flume` channel. The frame thread calls [`PendingAsset::poll`]
//! once per tick and performs any scene mutation itself, so no scene state
//! is ever touched from a loader thread.

use crate::assets::model::ModelData;
use crate::assets::io::AssetSource;
use crate::errors::{Error, Result};
use crate::resources::texture::Texture;

/// A load in flight.
pub struct PendingAsset<T> {
    label: String,
    receiver: flume::Receiver<Result<T>>,
    finished: bool,
}

pub type PendingModel = PendingAsset<ModelData>;
pub type PendingTexture = PendingAsset<Texture>;

impl<T: Send + 'static> PendingAsset<T> {
    /// Starts fetching `source` and decoding it with `decode`, both off the
    /// calling thread.
    pub fn spawn(source: &str, decode: impl FnOnce(Vec<u8>) -> Result<T> + Send + 'static) -> Self {
        let (sender, receiver) = flume::bounded(1);

        match AssetSource::parse(source) {
            Ok(asset_source) => {
                log::info!("Loading '{}'", asset_source.file_name());
                asset_source.fetch(move |bytes| {
                    // The receiver may already be gone if the stage shut down.
                    let _ = sender.send(bytes.and_then(decode));
                });
            }
            Err(e) => {
                let _ = sender.send(Err(e));
            }
        }

        Self {
            label: source.to_string(),
            receiver,
            finished: false,
        }
    }

    /// A load that has already completed with `result`.
    #[must_use]
    pub fn ready(label: &str, result: Result<T>) -> Self {
        let (sender, receiver) = flume::bounded(1);
        let _ = sender.send(result);
        Self {
            label: label.to_string(),
            receiver,
            finished: false,
        }
    }

    /// Takes the result if it has arrived.
    ///
    /// Yields `Some` exactly once; afterwards always `None`.
    pub fn poll(&mut self) -> Option<Result<T>> {
        if self.finished {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.finished = true;
                Some(result)
            }
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => {
                self.finished = true;
                Some(Err(Error::LoaderDisconnected(self.label.clone())))
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Fetches and parses a glTF/GLB bundle.
#[must_use]
pub fn load_model(source: &str) -> PendingModel {
    let name = AssetSource::parse(source).map_or_else(|_| source.to_string(), |s| s.file_name());
    PendingAsset::spawn(source, move |bytes| ModelData::parse(&bytes, &name))
}

/// Fetches and decodes an image into an RGBA8 texture.
#[must_use]
pub fn load_texture(source: &str) -> PendingTexture {
    let name = AssetSource::parse(source).map_or_else(|_| source.to_string(), |s| s.file_name());
    PendingAsset::spawn(source, move |bytes| Texture::decode(&name, &bytes))
}
