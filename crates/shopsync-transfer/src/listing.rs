//! Directory snapshots served by the uploads RPC handler.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use shopsync_entity::system::{SystemFile, SystemFolder};

/// Join a client-supplied relative path onto `root`. Anything that is not
/// a plain name component (`..`, roots, prefixes) is refused.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = relative.trim().trim_start_matches(['/', '\\']);
    let mut resolved = root.to_path_buf();
    for component in Path::new(&relative.replace('\\', "/")).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

/// Files directly inside `folder`, sorted by name.
pub fn list_files(root: &Path, folder: &Path) -> io::Result<Vec<SystemFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            files.push(system_file(root, &entry.path(), &metadata));
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Recursive snapshot of `folder`.
pub fn folder_tree(root: &Path, folder: &Path) -> io::Result<SystemFolder> {
    let metadata = fs::metadata(folder)?;
    let mut folders = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(folder_tree(root, &entry.path())?);
        }
    }
    folders.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(SystemFolder {
        path: folder.to_string_lossy().into_owned(),
        relative_path: relative_to(root, folder),
        name: file_name(folder),
        modified_at: modified(&metadata),
        files: list_files(root, folder)?,
        folders,
    })
}

fn system_file(root: &Path, path: &Path, metadata: &Metadata) -> SystemFile {
    SystemFile {
        path: path.to_string_lossy().into_owned(),
        relative_path: relative_to(root, path),
        name: file_name(path),
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
        modified_at: modified(metadata),
        size_bytes: metadata.len(),
    }
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn modified(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
