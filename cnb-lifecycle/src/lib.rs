//! This crate provides a small library to implement [Cloud Native Buildpacks](https://buildpacks.io/)
//! against the Buildpack API 0.4.
//!
//! Buildpacks implement the [`Buildpack`] trait and hand it to [`buildpack_main`], which wires the
//! single buildpack binary up to both `bin/detect` and `bin/build`.

// This lint triggers when both layer_dir and layers_dir are present which are quite common.
#![allow(clippy::similar_names)]

pub mod build;
pub mod data;
pub mod detect;
pub mod environment;
pub mod layer;

mod buildpack;
mod error;
mod runtime;
mod toml_file;

pub use buildpack::Buildpack;
pub use error::*;
pub use runtime::{cnb_runtime, cnb_runtime_build, cnb_runtime_detect, BuildArgs, DetectArgs};
pub use toml_file::*;

const SUPPORTED_BUILDPACK_API: data::buildpack::BuildpackApi =
    data::buildpack::BuildpackApi { major: 0, minor: 4 };

/// Generates a main function for the given buildpack.
///
/// It will create the main function and wires up the buildpack to the framework.
///
/// # Example:
/// ```
/// use cnb_lifecycle::build::{BuildContext, BuildResult};
/// use cnb_lifecycle::detect::{DetectContext, DetectResult};
/// use cnb_lifecycle::{buildpack_main, Buildpack};
///
/// struct MyBuildpack;
///
/// impl Buildpack for MyBuildpack {
///     type Error = std::io::Error;
///
///     fn detect(&self, context: DetectContext) -> cnb_lifecycle::Result<DetectResult, Self::Error> {
///         Ok(DetectResult::pass())
///     }
///
///     fn build(&self, context: BuildContext) -> cnb_lifecycle::Result<BuildResult, Self::Error> {
///         Ok(BuildResult::new(context.buildpack_plan))
///     }
/// }
///
/// buildpack_main!(MyBuildpack);
/// ```
#[macro_export]
macro_rules! buildpack_main {
    ($buildpack:expr) => {
        fn main() {
            ::cnb_lifecycle::cnb_runtime(&$buildpack);
        }
    };
}
