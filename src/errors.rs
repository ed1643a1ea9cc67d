//! Error Types
//!
//! This module defines the error type shared by the engine layer and the
//! interactive stage.
//!
//! # Overview
//!
//! [`Error`] covers the failure modes that can surface at runtime:
//! - GPU initialization failures
//! - Window and event loop failures
//! - Asset fetching and decoding errors
//!
//! Gameplay-level conditions (a missing clip, an empty gesture set, an
//! out-of-bounds click) are not errors: they are logged and handled in place.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use robot_stage::errors::Result;
//!
//! fn load() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the stage.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Window creation failed.
    #[error("Failed to create window: {0}")]
    WindowCreateFailed(#[from] winit::error::OsError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The loader thread dropped its channel without reporting a result.
    #[error("Loader for '{0}' disconnected before completing")]
    LoaderDisconnected(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// Transport-level HTTP failure (DNS, TLS, connection reset, ...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status} ({url})")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    // ========================================================================
    // Image & Format Errors
    // ========================================================================
    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// The bundle references data this loader cannot resolve.
    #[error("Unsupported glTF content: {0}")]
    UnsupportedGltf(String),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecodeError(err.to_string())
    }
}

impl From<gltf::Error> for Error {
    fn from(err: gltf::Error) -> Self {
        Error::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
