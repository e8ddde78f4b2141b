//! File export of the task collection.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::codec;
use crate::task::Task;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "output.txt";

/// Write the CSV encoding of `tasks` to `path`.
///
/// The content goes through a temp file next to `path` which is renamed into
/// place, so a failed write never leaves a partial export behind. Returns the
/// number of exported records.
pub fn write_export(path: &Path, tasks: &[Task]) -> io::Result<usize> {
    let content = codec::encode(tasks);
    let tmp = path.with_extension("export.tmp");
    let result = File::create(&tmp).and_then(|mut f| {
        f.write_all(content.as_bytes())?;
        f.flush()
    });
    if let Err(e) = result.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    info!(count = tasks.len(), path = %path.display(), "tasks exported");
    Ok(tasks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskType;

    #[test]
    fn test_write_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        let tasks = vec![Task {
            id: 0,
            date: "2024-01-01".to_string(),
            kind: TaskType::Other,
            content: "fix bug".to_string(),
        }];
        assert_eq!(write_export(&path, &tasks).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "id,date,type,content\n0,2024-01-01,other,fix bug\n"
        );
        assert!(!path.with_extension("export.tmp").exists());
    }

    #[test]
    fn test_export_empty_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILE);
        assert_eq!(write_export(&path, &[]).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_export_failure_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join(DEFAULT_EXPORT_FILE);
        assert!(write_export(&path, &[]).is_err());
        assert!(!path.with_extension("export.tmp").exists());
    }
}
