use crate::log::log_error;
use std::fmt::Debug;

/// Handles a given [`cnb_lifecycle::Error`] in a consistent style.
///
/// This function is intended to be used inside [`cnb_lifecycle::Buildpack::on_error`].
///
/// It outputs generic framework errors with [`log_error`]. Buildpack specific errors are
/// handled by the passed custom handler.
///
/// # Example:
/// ```
/// use cnb_commons::error::on_error;
/// use cnb_commons::log::log_error;
///
/// #[derive(Debug)]
/// enum FooBuildpackError {
///     InvalidFooDescriptorToml,
/// }
///
/// fn on_foo_buildpack_error(e: FooBuildpackError) {
///     match e {
///         FooBuildpackError::InvalidFooDescriptorToml => {
///             log_error("Invalid foo.toml", "Your app's foo.toml is invalid!");
///         }
///     }
/// }
///
/// on_error(
///     on_foo_buildpack_error,
///     cnb_lifecycle::Error::BuildpackError(FooBuildpackError::InvalidFooDescriptorToml),
/// );
/// ```
pub fn on_error<F, E>(f: F, error: cnb_lifecycle::Error<E>)
where
    E: Debug,
    F: Fn(E),
{
    match error {
        cnb_lifecycle::Error::BuildpackError(buildpack_error) => f(buildpack_error),
        framework_error => {
            log_error("Internal Buildpack Error", framework_error.to_string());
        }
    }
}
