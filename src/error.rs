use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of failures, mirroring how far a run got before it stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source workbook could not be read or lacks a required column.
    DataAccess,
    /// A font file is missing or not a usable TrueType/OpenType face.
    FontLoad,
    /// Writing an output document (or one of its transient images) failed.
    OutputIo,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("workbook XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("required column {index} missing (sheet has {available} columns)")]
    MissingColumn { index: usize, available: usize },

    #[error("font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("font not found: {0} (set BOOTH_PDF_FONTS or pass an explicit path)")]
    FontNotFound(String),

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("raster error: {0}")]
    Raster(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Source { .. }
            | Error::InvalidWorkbook(_)
            | Error::Xml(_)
            | Error::MissingColumn { .. } => ErrorKind::DataAccess,
            Error::FontLoad { .. } | Error::FontNotFound(_) => ErrorKind::FontLoad,
            Error::Output { .. } | Error::Image(_) | Error::Raster(_) => ErrorKind::OutputIo,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Output {
            path: path.into(),
            source,
        }
    }
}
