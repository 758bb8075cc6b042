//! Common code for buildpacks implemented with cnb-lifecycle.

pub mod digest;
pub mod download;
pub mod duration_format;
pub mod error;
pub mod log;
pub mod postal;
pub mod tgz;

#[cfg(test)]
pub(crate) mod mock_http;
