use relative_path::RelativePath;
use std::env;
use std::path::{Path, PathBuf};

/// Find absolute path to executable
///
/// First looks for executable in local directory (`in_dir`).
/// Otherwise, looks for executable in PATH.
pub fn find_executable_path<P>(binary_name: &str, in_dir: P) -> Result<PathBuf, which::Error>
where
    P: AsRef<Path>,
{
    let paths = in_dir.as_ref().as_os_str();

    let mut local_executables = which::which_in_global(binary_name, Some(paths))?;
    if let Some(path) = local_executables.next() {
        return Ok(path);
    }

    which::which(binary_name)
}

/// Turn a `/`-separated path from a config file into a platform path
///
/// Absolute paths are kept as they are.
pub fn config_path(path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        RelativePath::new(path).to_path("")
    }
}

/// Split file name on colon
///
/// This is especially important on Windows that uses colon to separate
/// disk name from the rest of the path.
pub fn split_file_name(p: &Path) -> (PathBuf, Option<String>) {
    if let Some(file_name) = p.file_name() {
        let mut new_path = PathBuf::from(p);

        if let Some((prefix, suffix)) = file_name.to_string_lossy().split_once(':') {
            new_path.set_file_name(prefix);

            return (new_path, Some(suffix.to_owned()));
        }
    }

    (p.to_path_buf(), None)
}

/// Path as it should be shown to someone typing commands in the current
/// directory
pub fn display_path<P>(path: P) -> String
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let relative = env::current_dir()
        .ok()
        .filter(|_| path.is_absolute())
        .and_then(|current_dir| pathdiff::diff_paths(path, current_dir));

    match relative {
        Some(relative) if !relative.as_os_str().is_empty() => relative.display().to_string(),
        _ => path.display().to_string(),
    }
}
