//! Capability-based filesystem helpers built on `cap-std` and `camino`.
//!
//! The pipeline only touches two directories: the query directory it reads
//! from and the output directory it writes to. Every access goes through an
//! ambient [`fs_utf8::Dir`] handle opened on the parent directory.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create `path` and any missing ancestors, handling absolute paths safely for cap-std.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<()> {
    if path.as_str().is_empty() || path == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(path)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Read the full contents of a regular file.
///
/// Returns `Ok(None)` when the file, or its parent directory, does not exist
/// or when the path names something other than a regular file.
pub fn read_regular_file(path: &Utf8Path) -> io::Result<Option<Vec<u8>>> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(opened) => opened,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) if meta.is_file() => dir.read(name.as_str()).map(Some),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Write `contents` to `path`, replacing any existing file.
///
/// The parent directory must already exist; see [`ensure_dir`].
pub fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;

            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_path.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        // Unix-style absolute path.
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        // Relative path: resolve from the current directory.
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;

    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    #[fixture]
    fn tmp() -> TempDir {
        TempDir::new().expect("failed to create temporary directory")
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path should be UTF-8")
    }

    #[rstest]
    fn ensure_dir_creates_nested_directories(tmp: TempDir) {
        let target = utf8(&tmp).join("data").join("layers");

        ensure_dir(&target).expect("directory should be created");
        ensure_dir(&target).expect("existing directory should be accepted");

        assert!(target.is_dir());
    }

    #[rstest]
    fn read_regular_file_returns_contents(tmp: TempDir) {
        let path = utf8(&tmp).join("gr.ql");
        fs::write(&path, b"[out:json];").expect("write query");

        let contents = read_regular_file(&path).expect("read should succeed");

        assert_eq!(contents.as_deref(), Some(b"[out:json];".as_slice()));
    }

    #[rstest]
    #[case::missing_file("absent.ql")]
    #[case::missing_parent("absent/villes.ql")]
    fn read_regular_file_reports_absence(tmp: TempDir, #[case] relative: &str) {
        let path = utf8(&tmp).join(relative);

        let contents = read_regular_file(&path).expect("absence is not an error");

        assert!(contents.is_none());
    }

    #[rstest]
    fn read_regular_file_ignores_directories(tmp: TempDir) {
        let path = utf8(&tmp).join("cascades.ql");
        fs::create_dir(&path).expect("create directory");

        let contents = read_regular_file(&path).expect("directories are not an error");

        assert!(contents.is_none());
    }

    #[rstest]
    fn write_file_replaces_existing_contents(tmp: TempDir) {
        let path = utf8(&tmp).join("poi_villes.geojson");
        fs::write(&path, b"stale contents from a previous run").expect("seed file");

        write_file(&path, b"{}").expect("write should succeed");

        assert_eq!(fs::read(&path).expect("read back"), b"{}");
    }
}
