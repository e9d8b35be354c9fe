use std::fs;
use std::io;
use std::path::PathBuf;

use crate::settings::Settings;

/// Create the tmp directory that holds build artifacts and the build log.
///
/// Failure is logged and returned; the supervisor may carry on without it.
pub fn init_folders(settings: &Settings) -> io::Result<PathBuf> {
    let path = settings.tmp_path();
    tracing::info!("mkdir {}", path.display());

    match fs::create_dir(&path) {
        Ok(()) => Ok(path),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            tracing::debug!("{} already exists", path.display());
            Ok(path)
        }
        Err(err) => {
            tracing::warn!("Failed to create {}: {}", path.display(), err);
            Err(err)
        }
    }
}
