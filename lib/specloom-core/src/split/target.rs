use std::borrow::Cow;
use std::iter;
use std::path::{Component, Path, PathBuf};

/// Makes a path absolute and removes its `.` and `..` components.
///
/// This is purely lexical: symbolic links are not resolved and the path does
/// not need to exist.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Computes the output file of a component or a path item.
///
/// When `source` lies under `base`, its relative location is mirrored below
/// `base` with the file name replaced by `<file_id>.<extension>`. Otherwise the
/// file lands directly in `base`.
///
/// ```rust
/// use specloom_core::split::target_path;
/// use std::path::Path;
///
/// let base = Path::new("/out/schemas");
/// let source = Path::new("/out/schemas/resturant/menu.yaml");
///
/// assert_eq!(
///     target_path(base, Some(source), "MenuItem", "yaml"),
///     Path::new("/out/schemas/resturant/MenuItem.yaml")
/// );
/// assert_eq!(
///     target_path(base, None, "MenuItem", "yaml"),
///     Path::new("/out/schemas/MenuItem.yaml")
/// );
/// ```
#[must_use]
pub fn target_path(base: &Path, source: Option<&Path>, file_id: &str, extension: &str) -> PathBuf {
    let file_name = format!("{file_id}.{extension}");
    let base = normalize(base);

    let mirrored = source
        .map(normalize)
        .and_then(|source| source.strip_prefix(&base).map(Path::to_path_buf).ok())
        .filter(|relative| !relative.as_os_str().is_empty());

    match mirrored {
        Some(relative) => base.join(relative).with_file_name(file_name),
        None => base.join(file_name),
    }
}

/// Computes the link from a file to another one.
///
/// The link is relative to the directory of `from_file`, uses forward slashes,
/// and starts with `./` unless it goes up with `../`.
#[must_use]
pub fn relative_link(from_file: &Path, to_file: &Path) -> String {
    let from_dir = from_file.parent().map_or_else(|| normalize(from_file), normalize);
    let to_file = normalize(to_file);

    let from = from_dir.components().collect::<Vec<_>>();
    let to = to_file.components().collect::<Vec<_>>();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(left, right)| left == right)
        .count();

    let segments = iter::repeat_n(Cow::Borrowed(".."), from.len().saturating_sub(common))
        .chain(
            to.iter()
                .skip(common)
                .map(|component| component.as_os_str().to_string_lossy()),
        )
        .collect::<Vec<_>>();
    let link = segments.join("/");

    if link.starts_with("../") {
        link
    } else {
        format!("./{link}")
    }
}
