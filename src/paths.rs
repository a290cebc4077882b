//! Lexical path helpers shared by the resolver and the scanner.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and fold `.`/`..` components.
///
/// Purely lexical: the path does not need to exist.
pub fn absolute_normalized(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_components(path)
    } else {
        normalize_path_components(&base.join(path))
    }
}

/// Normalize path components without requiring the file to exist.
pub fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => components.push(Component::RootDir),
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(Component::ParentDir),
            },
            Component::Normal(name) => components.push(Component::Normal(name)),
        }
    }

    components.iter().collect()
}

/// True when `path` names a filesystem location rather than a bundled resource.
///
/// Matches `./`, `../`, `/` prefixes and drive-letter forms such as `C:`.
pub fn is_filesystem_reference(path: &str) -> bool {
    path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.chars().nth(1) == Some(':')
}

/// Convert path to string using forward slashes.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
