//! Export of the rendered diagram.
//!
//! This module turns the vector output of the diagram on the [`Stage`] into a
//! downloadable [`ExportArtifact`]. It is the last step of the pipeline:
//!
//! ```text
//! Diagram text
//!     ↓ validate + layout (renderer)
//! Mounted diagram with vector output (stage)
//!     ↓ export (this module)
//! ExportArtifact (payload + temporary download file)
//! ```
//!
//! # Formats
//!
//! - [`svg`]: the vector markup, byte for byte
//! - [`png`]: the markup rasterized with `resvg` and encoded with `image`
//!
//! # Error Handling
//!
//! Export operations return [`ExportError`], which converts into
//! [`TesseraError::Export`](crate::TesseraError::Export) at the crate
//! boundary.

mod png;
mod svg;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use tempfile::TempPath;
use thiserror::Error;

use tessera_core::{
    color::Color,
    export::{ExportFormat, UnsupportedFormatError},
    theme::ThemePreference,
};

use crate::{config::ExportConfig, stage::Stage};

/// Largest PNG edge, in pixels, accepted by default.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

/// Errors that can occur during diagram export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No diagram to export")]
    NoDiagram,

    #[error("Diagram SVG not found")]
    NoVectorOutput,

    #[error("Failed to create PNG: {0}")]
    EncodingFailed(String),

    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A finished export.
///
/// The artifact owns a temporary file holding the payload, which stands in
/// for a download link. Call [`release`](Self::release) once the file has
/// been handed off; dropping the artifact also removes it.
#[derive(Debug)]
pub struct ExportArtifact {
    payload: Vec<u8>,
    file_name: String,
    format: ExportFormat,
    download: Option<TempPath>,
}

impl ExportArtifact {
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Suggested file name, `diagram-<unix millis>.<extension>`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Path of the temporary download file, until the artifact is released.
    pub fn download_path(&self) -> Option<&Path> {
        self.download.as_deref()
    }

    /// Copies the payload to `destination`. A directory destination receives
    /// the suggested file name.
    pub fn save_to(&self, destination: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let destination = destination.as_ref();
        let target = if destination.is_dir() {
            destination.join(&self.file_name)
        } else {
            destination.to_path_buf()
        };
        fs::write(&target, &self.payload)?;
        info!(path:? = target, bytes = self.payload.len(); "Export saved");
        Ok(target)
    }

    /// Deletes the temporary download file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be removed.
    pub fn release(&mut self) -> Result<(), ExportError> {
        if let Some(download) = self.download.take() {
            debug!(path:? = &*download; "Releasing download file");
            download.close()?;
        }
        Ok(())
    }
}

/// Receives finished exports before their download file is released.
pub trait DownloadSink {
    /// Delivers `artifact`, returning where it ended up.
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError>;
}

/// Saves exports to a fixed path. An existing directory receives the
/// suggested file name.
#[derive(Debug, Clone)]
pub struct PathSink {
    destination: PathBuf,
}

impl PathSink {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl DownloadSink for PathSink {
    fn deliver(&mut self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
        if let Some(parent) = self
            .destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        artifact.save_to(&self.destination)
    }
}

/// Produces [`ExportArtifact`]s from the stage.
#[derive(Debug, Clone)]
pub struct Exporter {
    background: Option<Color>,
    max_dimension: u32,
}

impl Default for Exporter {
    fn default() -> Self {
        Self {
            background: None,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an exporter from the `[export]` configuration section.
    pub fn from_config(config: &ExportConfig) -> Result<Self, String> {
        Ok(Self::new()
            .with_background(config.background()?)
            .with_max_dimension(config.max_dimension()))
    }

    /// Overrides the theme background behind PNG exports.
    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Exports the first rendered diagram on `stage`.
    ///
    /// # Errors
    ///
    /// - [`ExportError::NoDiagram`] when nothing is mounted
    /// - [`ExportError::NoVectorOutput`] when layout produced no SVG
    /// - [`ExportError::EncodingFailed`] when rasterization fails
    /// - [`ExportError::Io`] when the download file cannot be written
    pub async fn export(
        &self,
        stage: &Stage,
        format: ExportFormat,
        theme: ThemePreference,
    ) -> Result<ExportArtifact, ExportError> {
        let diagram = stage.first_diagram().ok_or(ExportError::NoDiagram)?;
        let vector = diagram.vector.ok_or(ExportError::NoVectorOutput)?;
        debug!(diagram:% = diagram.id, format:% = format; "Exporting diagram");

        let payload = match format {
            ExportFormat::Svg => svg::encode(&vector),
            ExportFormat::Png => {
                let background = self.background.unwrap_or_else(|| theme.background());
                let max_dimension = self.max_dimension;
                tokio::task::spawn_blocking(move || {
                    png::rasterize(&vector, background, max_dimension)
                })
                .await
                .map_err(|err| ExportError::EncodingFailed(err.to_string()))??
            }
        };

        let file_name = format!(
            "diagram-{}.{}",
            chrono::Utc::now().timestamp_millis(),
            format.extension()
        );
        let download = write_download(&payload, format)?;

        info!(file_name = file_name.as_str(), bytes = payload.len(); "Diagram exported");
        Ok(ExportArtifact {
            payload,
            file_name,
            format,
            download: Some(download),
        })
    }

    /// Parses `format` and exports.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnsupportedFormat`] for anything but `svg` or
    /// `png`, then the same errors as [`export`](Self::export).
    pub async fn export_named(
        &self,
        stage: &Stage,
        format: &str,
        theme: ThemePreference,
    ) -> Result<ExportArtifact, ExportError> {
        let format: ExportFormat = format.parse()?;
        self.export(stage, format, theme).await
    }
}

fn write_download(payload: &[u8], format: ExportFormat) -> Result<TempPath, ExportError> {
    let mut file = tempfile::Builder::new()
        .prefix("diagram-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()?;
    io::Write::write_all(&mut file, payload)?;
    Ok(file.into_temp_path())
}
