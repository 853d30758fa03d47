//! Filesystem access built on `cap-std` and `camino`.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Ensure the directory that will hold `path` exists.
pub(crate) fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let (base, relative) = split_root(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?.create_dir_all(&relative)
}

/// Split `dir` into an ambient base directory and a path relative to it.
fn split_root(dir: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    if dir.has_root() {
        let root: Utf8PathBuf = dir
            .components()
            .take_while(|component| {
                matches!(
                    component,
                    camino::Utf8Component::Prefix(_) | camino::Utf8Component::RootDir
                )
            })
            .collect();
        let relative = dir.strip_prefix(&root).map_or_else(|_| dir.to_path_buf(), Utf8Path::to_path_buf);
        (root, relative)
    } else {
        (Utf8PathBuf::from("."), dir.to_path_buf())
    }
}
