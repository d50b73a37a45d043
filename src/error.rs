//! Error types for the export-to-PDF pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while prettifying an export.
///
/// Everything here is fatal except [`Error::Outline`], which callers log and
/// swallow: a missing or partial PDF outline is cosmetic, not a correctness
/// problem.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("template '{name}' failed to render: {source}")]
    Template {
        name: String,
        #[source]
        source: tera::Error,
    },

    #[error("page renderer failed on {input}: {message}")]
    Render { input: PathBuf, message: String },

    #[error("no usable page renderer: {0}")]
    RendererUnavailable(String),

    #[error("cover page requested but neither cover.html nor cover.pdf is available")]
    MissingCover,

    #[error("failed to build document outline: {0}")]
    Outline(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
