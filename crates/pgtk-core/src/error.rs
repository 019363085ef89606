// src/error.rs
use thiserror::Error;

use crate::frame::FrameId;

/// Failures of the pgtk backend.
///
/// Missing preconditions (no input-method context, no focused frame) are not
/// errors: the affected event is dropped. These variants cover the things that
/// actually go wrong, from creating the toolkit context to rasterising preedit.
#[derive(Error, Debug)]
pub enum PgtkError {
    #[error("Input-method context creation failed: {message}")]
    ContextCreation { message: String },

    #[error("Font could not be loaded: {message}")]
    FontLoad { message: String },

    #[error("No font found for family: {family}")]
    FontNotFound { family: String },

    #[error("Preedit rendering failed: {message}")]
    Render { message: String },

    #[error("Invalid preedit image: {width}x{height} with stride {stride} and {len} bytes")]
    InvalidImage { width: u32, height: u32, stride: u32, len: usize },

    #[error("Unknown frame: {0}")]
    UnknownFrame(FrameId),

    #[error("Unknown input-method signal: {name}")]
    UnknownSignal { name: String },

    #[error("Invalid configuration: {field} = {value}")]
    ConfigurationError { field: String, value: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type PgtkResult<T> = Result<T, PgtkError>;
