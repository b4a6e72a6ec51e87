//! Year-partitioned storage of legacy feed files.
//!
//! One gzip-compressed `nvdcve-1.1-<year>.json.gz` per CVE year, rewritten
//! whole on every sync. The store never reorders items; output order is
//! whatever the caller hands in.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use nvd_mirror_model::legacy::CveFeed;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("no feed file for year {0}")]
    NotFound(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub struct FeedStore {
    db_dir: PathBuf,
}

impl FeedStore {
    pub fn new(db_dir: impl Into<PathBuf>) -> Self {
        Self {
            db_dir: db_dir.into(),
        }
    }

    pub fn path(&self, year: i32) -> PathBuf {
        self.db_dir.join(format!("nvdcve-1.1-{year}.json.gz"))
    }

    pub fn exists(&self, year: i32) -> bool {
        self.path(year).is_file()
    }

    /// Read and decompress the partition for `year`. Absence is an error:
    /// callers check `exists` first and treat a missing year as a fresh
    /// partition instead.
    pub fn read(&self, year: i32) -> Result<CveFeed, FeedError> {
        let file = match File::open(self.path(year)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(FeedError::NotFound(year))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_reader(GzDecoder::new(BufReader::new(
            file,
        )))?)
    }

    /// Serialize and compress the partition for `year`, replacing any
    /// previous file whole.
    pub fn write(&self, year: i32, feed: &CveFeed) -> Result<(), FeedError> {
        let file = File::create(self.path(year))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, feed)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Delete leftover feed artifacts from earlier runs: every
    /// `nvdcve-1.1-*.json.gz` partition and every `nvdcve-1.1-*.meta`
    /// checksum companion the retired feed downloads used to ship with.
    pub fn remove_stale(&self) -> io::Result<()> {
        for entry in fs::read_dir(&self.db_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with("nvdcve-1.1-")
                && (name.ends_with(".json.gz") || name.ends_with(".meta"))
            {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use nvd_mirror_model::legacy::{Cve, CveDataMeta, CveItem};

    use super::*;

    fn item(id: &str) -> CveItem {
        CveItem {
            cve: Cve {
                cve_data_meta: CveDataMeta {
                    assigner: String::new(),
                    id: id.to_string(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn feed(ids: &[&str]) -> CveFeed {
        let mut feed = CveFeed::empty("2024-01-03T19:01:13Z");
        feed.cve_items = ids.iter().map(|id| item(id)).collect();
        feed.update_count();
        feed
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path());

        let original = feed(&["CVE-2022-0001", "CVE-2022-0002"]);
        store.write(2022, &original).unwrap();

        assert!(store.exists(2022));
        let restored = store.read(2022).unwrap();
        assert_eq!(restored, original);
        assert_eq!(restored.cve_data_number_of_cves, "2");
    }

    #[test]
    fn files_are_gzip_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path());
        store.write(2022, &feed(&["CVE-2022-0001"])).unwrap();

        let mut magic = [0u8; 2];
        File::open(store.path(2022))
            .unwrap()
            .read_exact(&mut magic)
            .unwrap();
        assert_eq!(magic, [0x1f, 0x8b]);
    }

    #[test]
    fn read_missing_year_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path());

        assert!(!store.exists(2024));
        assert!(matches!(store.read(2024), Err(FeedError::NotFound(2024))));
    }

    #[test]
    fn write_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path());

        store
            .write(2022, &feed(&["CVE-2022-0001", "CVE-2022-0002"]))
            .unwrap();
        store.write(2022, &feed(&["CVE-2022-0003"])).unwrap();

        let restored = store.read(2022).unwrap();
        assert_eq!(restored.cve_items.len(), 1);
        assert_eq!(restored.cve_items[0].cve.cve_data_meta.id, "CVE-2022-0003");
    }

    #[test]
    fn remove_stale_targets_feed_artifacts_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeedStore::new(dir.path());

        fs::write(dir.path().join("nvdcve-1.1-2019.json.gz"), b"old").unwrap();
        fs::write(dir.path().join("nvdcve-1.1-2019.meta"), b"old").unwrap();
        fs::write(dir.path().join("last_mod_start_date.txt"), b"keep").unwrap();
        fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        store.remove_stale().unwrap();

        assert!(!dir.path().join("nvdcve-1.1-2019.json.gz").exists());
        assert!(!dir.path().join("nvdcve-1.1-2019.meta").exists());
        assert!(dir.path().join("last_mod_start_date.txt").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
