use std::path::Path;

/// Removes `dir` and everything beneath it. A directory that doesn't exist is
/// already clean.
pub fn rmdir(dir: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(e),
        },
    }
}
