//! CSV discovery and loading.
//!
//! Reads the registration table (a single CSV file or a directory of them)
//! and materializes every row as a [`VehicleRecord`] before any aggregation
//! runs.

use std::path::{Path, PathBuf};

use ev_core::config::FieldNames;
use ev_core::error::{EvError, Result};
use ev_core::models::VehicleRecord;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every record under `data_path`.
///
/// * A file path is read directly, whatever its extension.
/// * A directory is scanned with [`find_csv_files`] and the files are read in
///   path order, their rows concatenated.
///
/// Any unreadable or malformed file fails the whole load; a partially read
/// data set would silently skew every view.
pub fn load_records(data_path: &Path, names: &FieldNames) -> Result<Vec<VehicleRecord>> {
    if !data_path.exists() {
        return Err(EvError::DataPathNotFound(data_path.to_path_buf()));
    }

    if data_path.is_file() {
        return read_csv_file(data_path, names);
    }

    let files = find_csv_files(data_path);
    if files.is_empty() {
        return Err(EvError::NoDataFiles(data_path.to_path_buf()));
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(read_csv_file(file, names)?);
    }

    debug!(
        "Loaded {} records from {} files",
        records.len(),
        files.len()
    );
    Ok(records)
}

/// Parse CSV text that is already in memory.
pub fn parse_records<R: std::io::Read>(
    source: R,
    names: &FieldNames,
) -> std::result::Result<Vec<VehicleRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(VehicleRecord::from_fields(headers.iter().zip(row.iter()), names));
    }
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_csv_file(path: &Path, names: &FieldNames) -> Result<Vec<VehicleRecord>> {
    let file = std::fs::File::open(path).map_err(|source| EvError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(std::io::BufReader::new(file), names).map_err(|source| {
        EvError::Csv {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!("File {}: {} records", path.display(), records.len());
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "VIN (1-10),County,City,Model Year,Make,Model,Electric Vehicle Type,Electric Range";

    fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        std::fs::write(&path, content).expect("write csv");
        path
    }

    // ── parse_records ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_records_reads_named_columns() {
        let csv = format!(
            "{HEADER}\n5YJYGDEE1L,King,Seattle,2020,TESLA,MODEL Y,Battery Electric Vehicle (BEV),291\n"
        );
        let records = parse_records(csv.as_bytes(), &FieldNames::default()).expect("parse");

        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.vin.as_deref(), Some("5YJYGDEE1L"));
        assert_eq!(rec.group_key(), Some("King"));
        assert_eq!(rec.model_year(), Some(2020));
        assert_eq!(rec.manufacturer(), Some("TESLA"));
        assert_eq!(rec.electric_range.as_deref(), Some("291"));
    }

    #[test]
    fn test_parse_records_skips_blank_lines() {
        let csv = format!("{HEADER}\n,,,,,,,\nA,King,Kent,2021,NISSAN,LEAF,Battery Electric Vehicle (BEV),150\n\n");
        let records = parse_records(csv.as_bytes(), &FieldNames::default()).expect("parse");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_records_missing_columns_are_absent() {
        let csv = "Make,Model Year\nKIA,2022\n";
        let records = parse_records(csv.as_bytes(), &FieldNames::default()).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].manufacturer(), Some("KIA"));
        assert!(records[0].county.is_none());
        assert!(records[0].electric_range.is_none());
    }

    #[test]
    fn test_parse_records_quoted_fields() {
        let csv = "Make,City\n\"FORD\",\"Walla Walla, East\"\n";
        let records = parse_records(csv.as_bytes(), &FieldNames::default()).expect("parse");
        assert_eq!(records[0].city.as_deref(), Some("Walla Walla, East"));
    }

    // ── load_records ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_records_single_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_csv(
            tmp.path(),
            "ev.csv",
            &[
                "A,King,Seattle,2020,TESLA,MODEL 3,Battery Electric Vehicle (BEV),220",
                "B,Pierce,Tacoma,2018,CHEVROLET,VOLT,Plug-in Hybrid Electric Vehicle (PHEV),53",
            ],
        );

        let records = load_records(&path, &FieldNames::default()).expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].group_key(), Some("Pierce"));
    }

    #[test]
    fn test_load_records_directory_in_path_order() {
        let tmp = TempDir::new().expect("tempdir");
        write_csv(tmp.path(), "b.csv", &["B,King,Seattle,2021,KIA,EV6,Battery Electric Vehicle (BEV),0"]);
        write_csv(tmp.path(), "a.csv", &["A,King,Seattle,2020,KIA,NIRO,Battery Electric Vehicle (BEV),239"]);
        std::fs::write(tmp.path().join("notes.txt"), "ignored").expect("write");

        let records = load_records(tmp.path(), &FieldNames::default()).expect("load");
        let vins: Vec<&str> = records.iter().filter_map(|r| r.vin.as_deref()).collect();
        assert_eq!(vins, vec!["A", "B"]);
    }

    #[test]
    fn test_load_records_missing_path() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_records(&tmp.path().join("absent.csv"), &FieldNames::default()).unwrap_err();
        assert!(matches!(err, EvError::DataPathNotFound(_)));
    }

    #[test]
    fn test_load_records_empty_directory() {
        let tmp = TempDir::new().expect("tempdir");
        let err = load_records(tmp.path(), &FieldNames::default()).unwrap_err();
        assert!(matches!(err, EvError::NoDataFiles(_)));
    }

    #[test]
    fn test_load_records_header_only_is_empty_not_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_csv(tmp.path(), "ev.csv", &[]);
        let records = load_records(&path, &FieldNames::default()).expect("load");
        assert!(records.is_empty());
    }

    #[test]
    fn test_find_csv_files_sorted_and_filtered() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("2024");
        std::fs::create_dir_all(&nested).expect("mkdir");
        write_csv(&nested, "z.csv", &[]);
        write_csv(tmp.path(), "m.CSV", &[]);
        std::fs::write(tmp.path().join("readme.md"), "x").expect("write");

        let files = find_csv_files(tmp.path());
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
    }
}
