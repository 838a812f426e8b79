//! Filesystem helpers built on `cap-std` and `camino`.

use std::io::{self, BufRead, BufReader};

use bzip2::read::MultiBzDecoder;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

const BZIP2_EXTENSION: &str = "bz2";
const OUTPUT_EXTENSION: &str = "json";

/// Open an extract for buffered reading, decompressing `.bz2` files on the
/// fly.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_source(path: &Utf8Path) -> io::Result<Box<dyn BufRead>> {
    let file = open_file(path)?;
    if is_bz2(path) {
        Ok(Box::new(BufReader::new(MultiBzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Open a file for reading with ambient authority.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Whether `path` exists and is a regular file.
///
/// # Errors
/// Returns the underlying I/O error, including `NotFound`, when the path
/// cannot be inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path {path} has no file name"),
        )
    })?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent_or_current(path), ambient_authority())?;
    dir.metadata(file_name).map(|meta| meta.is_file())
}

fn parent_or_current(path: &Utf8Path) -> &Utf8Path {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    }
}

/// Create (or truncate) an output file, creating missing parent directories.
///
/// # Errors
/// Returns an I/O error when the path has no file name or the file cannot be
/// created.
pub fn create_output(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {path} has no file name"),
        )
    })?;
    let parent = parent_or_current(path);
    fs_utf8::Dir::create_ambient_dir_all(parent, ambient_authority())?;
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.create(file_name)
}

/// Whether the path names a bzip2-compressed file.
#[must_use]
pub fn is_bz2(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case(BZIP2_EXTENSION))
}

/// Output path used when none is given: the input path with `.json`
/// appended.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use osm_audit_data::fs::default_output_path;
///
/// assert_eq!(
///     default_output_path(Utf8Path::new("maps/mississauga.osm")),
///     "maps/mississauga.osm.json"
/// );
/// ```
#[must_use]
pub fn default_output_path(input: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{input}.{OUTPUT_EXTENSION}"))
}
