use crate::build::DependencyService;
use crate::cache::CacheMatcher;
use crate::version_parser::{VersionParseError, VersionParser};
use cnb_commons::postal::{self, Dependency};
use cnb_lifecycle::data::buildpack::BuildpackDescriptor;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use toml::value::Table;

pub(crate) fn buildpack_descriptor() -> BuildpackDescriptor {
    toml::from_str(
        r#"
api = "0.4"

[buildpack]
id = "org.cloudfoundry.yarn"
name = "Yarn Buildpack"
version = "1.2.3"

[[stacks]]
id = "some-stack"
"#,
    )
    .unwrap()
}

/// Returns a canned result once and records the path it was asked for.
pub(crate) struct FakeVersionParser {
    result: RefCell<Option<Result<String, VersionParseError>>>,
    received_path: RefCell<Option<PathBuf>>,
}

impl FakeVersionParser {
    pub(crate) fn returning(result: Result<String, VersionParseError>) -> Self {
        Self {
            result: RefCell::new(Some(result)),
            received_path: RefCell::new(None),
        }
    }

    pub(crate) fn received_path(&self) -> Option<PathBuf> {
        self.received_path.borrow().clone()
    }
}

impl VersionParser for FakeVersionParser {
    fn parse_version(&self, path: &Path) -> Result<String, VersionParseError> {
        self.received_path.replace(Some(path.to_path_buf()));
        self.result
            .borrow_mut()
            .take()
            .expect("FakeVersionParser called more than once")
    }
}

pub(crate) struct FakeCacheMatcher {
    matches: bool,
    calls: RefCell<Vec<(Table, String, String)>>,
}

impl FakeCacheMatcher {
    pub(crate) fn returning(matches: bool) -> Self {
        Self {
            matches,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(Table, String, String)> {
        self.calls.borrow().clone()
    }
}

impl CacheMatcher for FakeCacheMatcher {
    fn matches(&self, metadata: &Table, key: &str, sha: &str) -> bool {
        self.calls
            .borrow_mut()
            .push((metadata.clone(), String::from(key), String::from(sha)));
        self.matches
    }
}

pub(crate) struct FakeDependencyService {
    dependency: Dependency,
    resolve_error: RefCell<Option<postal::Error>>,
    install_error: RefCell<Option<postal::Error>>,
    resolve_calls: RefCell<Vec<(PathBuf, String, String, String)>>,
    install_calls: RefCell<Vec<(Dependency, PathBuf, PathBuf)>>,
}

impl FakeDependencyService {
    pub(crate) fn resolving(dependency: Dependency) -> Self {
        Self {
            dependency,
            resolve_error: RefCell::new(None),
            install_error: RefCell::new(None),
            resolve_calls: RefCell::new(Vec::new()),
            install_calls: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn failing_resolve(error: postal::Error) -> Self {
        let service = Self::resolving(Dependency::default());
        service.resolve_error.replace(Some(error));
        service
    }

    pub(crate) fn failing_install(self, error: postal::Error) -> Self {
        self.install_error.replace(Some(error));
        self
    }

    pub(crate) fn resolve_calls(&self) -> Vec<(PathBuf, String, String, String)> {
        self.resolve_calls.borrow().clone()
    }

    pub(crate) fn install_calls(&self) -> Vec<(Dependency, PathBuf, PathBuf)> {
        self.install_calls.borrow().clone()
    }
}

impl DependencyService for FakeDependencyService {
    fn resolve(
        &self,
        path: &Path,
        name: &str,
        version: &str,
        stack: &str,
    ) -> Result<Dependency, postal::Error> {
        self.resolve_calls.borrow_mut().push((
            path.to_path_buf(),
            String::from(name),
            String::from(version),
            String::from(stack),
        ));

        match self.resolve_error.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(self.dependency.clone()),
        }
    }

    fn install(
        &self,
        dependency: &Dependency,
        cnb_path: &Path,
        layer_path: &Path,
    ) -> Result<(), postal::Error> {
        self.install_calls.borrow_mut().push((
            dependency.clone(),
            cnb_path.to_path_buf(),
            layer_path.to_path_buf(),
        ));

        match self.install_error.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
