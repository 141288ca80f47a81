//! core::paths
//!
//! Lexical path resolution for the session working directory.
//!
//! # Semantics
//!
//! [`resolve`] behaves like a shell `cd` that never touches the disk:
//! relative paths are joined onto the base, absolute paths replace it,
//! and `.`/`..` components and trailing separators are normalized away.
//! `..` at the root stays at the root.
//!
//! # Example
//!
//! ```
//! use p4session::core::paths::resolve;
//! use std::path::{Path, PathBuf};
//!
//! assert_eq!(resolve(Path::new("/dir0"), "sub"), PathBuf::from("/dir0/sub"));
//! assert_eq!(resolve(Path::new("/dir0"), "/abs/"), PathBuf::from("/abs"));
//! assert_eq!(resolve(Path::new("/a/b"), "../c"), PathBuf::from("/a/c"));
//! ```

use std::path::{Component, Path, PathBuf};

/// Resolve `target` against `base` and normalize the result.
pub fn resolve(base: &Path, target: impl AsRef<Path>) -> PathBuf {
    normalize(&base.join(target))
}

/// Normalize a path lexically, without following symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
