//! Checkpoint reader and writer
//!
//! The header is validated before any row is parsed. A mismatch is fatal: the
//! caller gets an error and nothing is written. Output goes to a temporary
//! file next to the destination and is renamed into place.

use crate::record::RecordState;
use crate::schema::{CheckpointRow, SCHEMA};
use a2p_common::{A2pError, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Check a header row against [`SCHEMA`]
pub fn validate_header(header: &StringRecord) -> Result<()> {
    for (position, (found, expected)) in header.iter().zip(SCHEMA.iter()).enumerate() {
        if found != *expected {
            return Err(A2pError::HeaderMismatch {
                position: position + 1,
                found: found.to_string(),
                expected: (*expected).to_string(),
            });
        }
    }

    if header.len() != SCHEMA.len() {
        return Err(A2pError::HeaderLength {
            found: header.len(),
            expected: SCHEMA.len(),
        });
    }

    Ok(())
}

/// Parse a checkpoint from any reader
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RecordState>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let header = reader.headers()?.clone();
    validate_header(&header)?;

    reader
        .deserialize::<CheckpointRow>()
        .enumerate()
        .map(|(index, row)| Ok(RecordState::from_row(index, row?)))
        .collect()
}

/// Load the checkpoint at `path`
pub fn read_checkpoint(path: &Path) -> Result<Vec<RecordState>> {
    let file = File::open(path)?;
    let records = read_records(file)?;
    info!(path = %path.display(), rows = records.len(), "Loaded checkpoint");
    Ok(records)
}

/// Serialize records, header first, in the order given
pub fn write_records<W: Write>(writer: W, records: &[RecordState]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(SCHEMA)?;
    for record in records {
        writer.serialize(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace the checkpoint at `path` with `records`
pub fn write_checkpoint(path: &Path, records: &[RecordState]) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(parent)?;
    write_records(staged.as_file_mut(), records)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| A2pError::Io(e.error))?;

    debug!(path = %path.display(), rows = records.len(), "Wrote checkpoint");
    Ok(())
}

/// Write a checkpoint that holds only the header
pub fn write_template(path: &Path) -> Result<()> {
    write_checkpoint(path, &[])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::record::fixtures::applicant_row;
    use tempfile::TempDir;

    fn sheet(rows: &[CheckpointRow]) -> Vec<u8> {
        let records: Vec<_> = rows
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, row)| RecordState::from_row(i, row))
            .collect();
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).unwrap();
        buffer
    }

    #[test]
    fn test_read_preserves_order_and_indices() {
        let bytes = sheet(&[
            applicant_row("alpha"),
            CheckpointRow::default(),
            applicant_row("gamma"),
        ]);
        let records = read_records(bytes.as_slice()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].applicant.friendly_id, "alpha");
        assert!(records[1].is_blank());
        assert_eq!(records[2].index(), 2);
        assert_eq!(records[2].row_number(), 4);
    }

    #[test]
    fn test_renamed_column_is_rejected() {
        let bytes = sheet(&[applicant_row("alpha")]);
        let text = String::from_utf8(bytes).unwrap().replacen("contactEmail", "email", 1);

        let err = read_records(text.as_bytes()).unwrap_err();
        match err {
            A2pError::HeaderMismatch {
                position,
                found,
                expected,
            } => {
                assert_eq!(position, 9);
                assert_eq!(found, "email");
                assert_eq!(expected, "contactEmail");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_legacy_header_is_rejected() {
        // the version 1 sheet lacks the intermediate identifier columns
        let legacy: Vec<&str> = SCHEMA
            .iter()
            .copied()
            .filter(|c| {
                !matches!(
                    *c,
                    "businessInformationSid"
                        | "authorizedRepSid"
                        | "addressSid"
                        | "customerDocumentSid"
                        | "trustBundleEndUserSid"
                )
            })
            .collect();
        let text = format!("{}\n", legacy.join(","));

        let err = read_records(text.as_bytes()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_extra_trailing_column_is_rejected() {
        let text = format!("{},notes\n", SCHEMA.join(","));
        let err = read_records(text.as_bytes()).unwrap_err();
        assert!(matches!(err, A2pError::HeaderLength { found: 58, expected: 57 }));
    }

    #[test]
    fn test_write_checkpoint_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale").unwrap();

        let records = vec![RecordState::from_row(0, applicant_row("alpha"))];
        write_checkpoint(&path, &records).unwrap();

        let reloaded = read_checkpoint(&path).unwrap();
        assert_eq!(reloaded, records);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_template_is_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("template.csv");
        write_template(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), SCHEMA.join(","));
        assert!(read_checkpoint(&path).unwrap().is_empty());
    }
}
