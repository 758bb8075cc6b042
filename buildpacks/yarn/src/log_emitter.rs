use cnb_commons::duration_format::{human, round_to_millis};
use cnb_commons::log::Logger;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// The build output of this buildpack.
pub(crate) struct LogEmitter<W: Write> {
    logger: Logger<W>,
}

impl<W: Write> LogEmitter<W> {
    pub(crate) fn new(logger: Logger<W>) -> Self {
        Self { logger }
    }

    pub(crate) fn buildpack_title(&mut self, name: &str, version: &str) {
        self.logger.title(format!("{name} {version}"));
    }

    pub(crate) fn process(&mut self, message: impl AsRef<str>) {
        self.logger.process(message);
    }

    pub(crate) fn subprocess(&mut self, message: impl AsRef<str>) {
        self.logger.subprocess(message);
    }

    pub(crate) fn completion_time(&mut self, duration: Duration) {
        self.logger
            .action(format!("Completed in {}", human(&round_to_millis(duration))));
        self.logger.break_line();
    }

    pub(crate) fn reusing_layer(&mut self, layer_path: &Path) {
        self.logger
            .process(format!("Reusing cached layer {}", layer_path.display()));
        self.logger.break_line();
    }

    /// Announces `yarn install` for the app dependencies. Build only installs Yarn itself, so
    /// nothing emits this yet.
    #[allow(dead_code)]
    pub(crate) fn running_install(&mut self, offline: bool) {
        let install_message = if offline { "Running offline" } else { "Running" };
        self.logger
            .subprocess(format!("{install_message} 'yarn install'"));
    }

    /// Reports whether the app ships a `yarn.lock`. Unused for the same reason as
    /// [`Self::running_install`].
    #[allow(dead_code)]
    pub(crate) fn found_yarn_lock(&mut self, found: bool) {
        let found_message = if found { "Found" } else { "Not found" };
        self.logger.action(format!("yarn.lock -> {found_message}"));
        self.logger.break_line();
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.logger.into_inner()
    }
}
