use crate::build::{BuildContext, BuildResult};
use crate::detect::{DetectContext, DetectResult};
use std::fmt::Debug;

/// Represents a buildpack written with the cnb-lifecycle framework.
///
/// To implement a buildpack with this framework, start by implementing this trait. Besides the
/// main build and detect methods, it also holds the custom error type of the buildpack.
pub trait Buildpack {
    /// The error type for buildpack specific errors, usually an enum. The framework itself has its
    /// [own error type](crate::Error) that contains the low-level errors that can occur during
    /// buildpack execution.
    type Error: Debug;

    /// Detect logic for this buildpack. Directly corresponds to
    /// [detect in the CNB buildpack interface](https://github.com/buildpacks/spec/blob/buildpack/v0.4/buildpack.md#detection).
    fn detect(&self, context: DetectContext) -> crate::Result<DetectResult, Self::Error>;

    /// Build logic for this buildpack. Directly corresponds to
    /// [build in the CNB buildpack interface](https://github.com/buildpacks/spec/blob/buildpack/v0.4/buildpack.md#build).
    fn build(&self, context: BuildContext) -> crate::Result<BuildResult, Self::Error>;

    /// If an unhandled error occurred within the framework or the buildpack, this method will be
    /// called by the framework to allow custom, buildpack specific, code to run before exiting.
    /// Usually, this method is implemented by logging the error in a user friendly manner.
    ///
    /// The default implementation will simply print the error
    /// (using its [`Debug`](std::fmt::Debug) implementation) to stderr.
    fn on_error(&self, error: crate::Error<Self::Error>) {
        eprintln!("Unhandled error:");
        eprintln!("> {error:?}");
        eprintln!("Buildpack will exit!");
    }
}
