mod build;
mod cache;
mod clock;
mod detect;
mod log_emitter;
#[cfg(test)]
mod test_support;
mod version_parser;

use crate::cache::CacheHandler;
use crate::clock::Clock;
use crate::log_emitter::LogEmitter;
use crate::version_parser::{BuildpackYmlParser, PackageJsonParser, VersionParseError};
use chrono::Utc;
use cnb_commons::log::{log_error, Logger};
use cnb_commons::postal;
use cnb_lifecycle::build::{BuildContext, BuildResult};
use cnb_lifecycle::detect::{DetectContext, DetectResult};
use cnb_lifecycle::layer::LayerError;
use cnb_lifecycle::{buildpack_main, Buildpack};

// Suppress warnings due to the `unused_crate_dependencies` lint not handling integration tests well.
#[cfg(test)]
use libcnb_test as _;

pub(crate) struct YarnBuildpack;

impl Buildpack for YarnBuildpack {
    type Error = YarnBuildpackError;

    fn detect(&self, context: DetectContext) -> cnb_lifecycle::Result<DetectResult, Self::Error> {
        detect::detect(&context, &PackageJsonParser, &BuildpackYmlParser)
            .map_err(cnb_lifecycle::Error::BuildpackError)
    }

    fn build(&self, context: BuildContext) -> cnb_lifecycle::Result<BuildResult, Self::Error> {
        build::build(
            &context,
            &postal::Service::default(),
            &CacheHandler,
            &Clock::new(Utc::now),
            &mut LogEmitter::new(Logger::new(std::io::stdout())),
        )
        .map_err(cnb_lifecycle::Error::BuildpackError)
    }

    fn on_error(&self, error: cnb_lifecycle::Error<Self::Error>) {
        cnb_commons::error::on_error(
            |buildpack_error: YarnBuildpackError| {
                log_error("Yarn Buildpack Error", buildpack_error.to_string());
            },
            error,
        );
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum YarnBuildpackError {
    #[error(transparent)]
    VersionParse(#[from] VersionParseError),

    #[error("failed to serialize metadata: {0}")]
    SerializeMetadata(#[from] toml::ser::Error),

    #[error(transparent)]
    Layer(#[from] LayerError),

    #[error(transparent)]
    Dependency(#[from] postal::Error),
}

buildpack_main!(YarnBuildpack);
