//! CSV export of a finished cycle's records.
//!
//! Export is best effort: the caller logs failures and moves on, and a failed
//! export never affects what is published.

use crate::errors::{Error, Result};
use crate::model::Record;
use std::fs;
use std::path::Path;

/// Write `records` to `path` with the upstream's column names as header.
///
/// The parent directory is created if needed. The file is written to a
/// sibling temp path and renamed into place, so readers never see a
/// half-written export.
pub fn write_records_csv(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| Error::file_system("Failed to create export directory", parent, e))?;
    }

    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp).map_err(|e| csv_to_fs(e, &tmp))?;
        for record in records {
            writer.serialize(record).map_err(|e| csv_to_fs(e, &tmp))?;
        }
        writer
            .flush()
            .map_err(|e| Error::file_system("Failed to flush export", &tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| Error::file_system("Failed to move export into place", path, e))?;

    tracing::info!(path = %path.display(), records = records.len(), "exported records");
    Ok(())
}

fn csv_to_fs(err: csv::Error, path: &Path) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::file_system("Failed to write export", path, source),
        _ => Error::FileSystem {
            message: format!("Failed to write export: {message}"),
            path: Some(path.to_path_buf()),
            source: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_page;
    use crate::errors::ErrorClass;
    use crate::testkit::record;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_directory_and_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.csv");
        let mut bug = record(7, "M6", "Core", "NEW");
        bug.summary = "Crash, with comma".into();

        write_records_csv(&path, &[bug.clone(), record(9, "M7", "UI", "RESOLVED")]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(
            "Bug ID,Fission Milestone,Product,Component,Status,Priority,Assignee,Summary,Resolution\n"
        ));
        assert!(!path.with_extension("csv.tmp").exists());

        // The export is itself a valid page.
        let records: Vec<Record> = decode_page(written.as_bytes())
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records[0], bug);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_unwritable_location_is_filesystem_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_records_csv(&blocker.join("report.csv"), &[]).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Filesystem);
    }
}
