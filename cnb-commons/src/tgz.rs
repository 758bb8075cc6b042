use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive;

/// Decompresses and untars a gzipped tarball from `reader` into `destination`.
///
/// The first `strip_components` path components of every entry are dropped. Entries that have no
/// path left after stripping, or that would escape `destination`, are skipped. The reader is not
/// necessarily consumed to its end.
pub fn extract(
    reader: impl Read,
    destination: impl AsRef<Path>,
    strip_components: usize,
) -> Result<(), Error> {
    let destination = destination.as_ref();
    let mut archive = Archive::new(GzDecoder::new(reader));

    for entry in archive.entries().map_err(Error::Entries)? {
        let mut entry = entry.map_err(Error::Entry)?;
        let path = entry.path().map_err(Error::Path)?.into_owned();

        let Some(relative_path) = strip_path(&path, strip_components) else {
            continue;
        };

        let target_path = destination.join(relative_path);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).map_err(Error::Unpack)?;
        }

        entry.unpack(&target_path).map_err(Error::Unpack)?;
    }

    Ok(())
}

fn strip_path(path: &Path, strip_components: usize) -> Option<PathBuf> {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let stripped = components
        .into_iter()
        .skip(strip_components)
        .collect::<PathBuf>();

    (!stripped.as_os_str().is_empty()).then_some(stripped)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error reading archive entries: {0}")]
    Entries(std::io::Error),

    #[error("Error reading archive entry: {0}")]
    Entry(std::io::Error),

    #[error("Error reading archive file path: {0}")]
    Path(std::io::Error),

    #[error("Error writing archive entry: {0}")]
    Unpack(std::io::Error),
}
