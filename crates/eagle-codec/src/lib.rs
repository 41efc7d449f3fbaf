//! # eagle-codec
//!
//! Async framing layer for EAGLE query service responses.
//!
//! This crate turns a raw response body into lines and drives the
//! `eagle-protocol` parser frame by frame, so a response is parsed while it
//! is still arriving and never buffered whole.
//!
//! ## Architecture
//!
//! ```text
//! HTTP body (AsyncRead) → LineCodec (line framing) → ResponseParser → ResultSet
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use eagle_codec::read_result_set;
//!
//! let body: &[u8] = b"#OK\n#QUERYTIMEOUT 1\n#QUERYTIME 1\n";
//! let result = read_result_set(body).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod line_codec;
pub mod reader;

pub use error::CodecError;
pub use line_codec::{DEFAULT_MAX_LINE_LENGTH, LineCodec};
pub use reader::{ResponseReader, read_lines, read_result_set};
