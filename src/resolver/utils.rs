use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

pub fn set_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Copies `src` into `dir` under `file_name` and marks it executable.
///
/// The data is staged in a temporary file inside `dir` and renamed into
/// place, so an interrupted copy never leaves a partial file at the target.
pub fn install_file(src: &Path, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    let dest = dir.join(file_name);
    let mut staged = tempfile::Builder::new().prefix(".partial-").tempfile_in(dir)?;

    let mut input = File::open(src)?;
    io::copy(&mut input, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    set_executable(staged.path())?;

    staged.persist(&dest).map_err(|e| e.error)?;
    Ok(dest)
}
