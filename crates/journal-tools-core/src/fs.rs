use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::error::{ToolError, ToolResult};

pub fn read_text(path: &Path) -> ToolResult<String> {
    fs::read_to_string(path).map_err(|err| ToolError::io(path, err))
}

/// Replace `path` with `content` through a temporary file in the same
/// directory. With `backup`, the previous content is copied to `<path>.bak`
/// first. Unix permission bits of an existing target are carried over.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> ToolResult<()> {
    let parent = parent_dir(path);
    fs::create_dir_all(&parent).map_err(|err| ToolError::io(&parent, err))?;

    let mut tmp = Builder::new()
        .prefix(".journal-tools")
        .tempfile_in(&parent)
        .map_err(|err| ToolError::io(&parent, err))?;

    tmp.as_file_mut()
        .write_all(content.as_bytes())
        .and_then(|_| tmp.as_file_mut().sync_all())
        .map_err(|err| ToolError::io(tmp.path(), err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let perm = metadata.permissions().mode();
            let _ = fs::set_permissions(tmp.path(), fs::Permissions::from_mode(perm));
        }
    }

    if backup && path.exists() {
        let backup_path = backup_path(path);
        fs::copy(path, &backup_path).map_err(|err| ToolError::io(&backup_path, err))?;
    }

    tmp.persist(path)
        .map(|_| ())
        .map_err(|err| ToolError::io(path, err.error))
}

pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
