use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the marker inside the database directory.
pub const MARKER_FILE: &str = "last_mod_start_date.txt";

/// Watermark of the last completed sync: the upstream server timestamp of
/// the final fetched page. The value is opaque, stored verbatim and replayed
/// into the next update window's `lastModStartDate` without parsing. Its
/// mere presence is what switches the engine from initial to update mode.
pub struct SyncMarker {
    path: PathBuf,
}

impl SyncMarker {
    pub fn new(db_dir: impl AsRef<Path>) -> Self {
        Self {
            path: db_dir.as_ref().join(MARKER_FILE),
        }
    }

    /// `None` when no sync has completed yet.
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(value) => Ok(Some(value.trim_end().to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn store(&self, value: &str) -> io::Result<()> {
        fs::write(&self.path, value)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
