use chrono::{NaiveDate, NaiveDateTime};
use parkwait_model::{AttractionSnapshot, ParkIdentity};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Byte-order mark written at the start of each ledger so spreadsheet tools
/// detect UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const TIME_COLUMN: &str = "time";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("ledger {0} has no header row")]
    MissingHeader(PathBuf),
}

/// The frozen column set of one day's ledger: attraction names in the order
/// captured when the header was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSchema {
    attractions: Vec<String>,
}

impl LedgerSchema {
    fn from_snapshot(snapshot: &AttractionSnapshot) -> Self {
        Self {
            attractions: snapshot.names().map(str::to_string).collect(),
        }
    }

    fn from_header(header: &csv::StringRecord) -> Self {
        Self {
            attractions: header.iter().skip(1).map(str::to_string).collect(),
        }
    }

    pub fn attractions(&self) -> &[String] {
        &self.attractions
    }

    pub fn header(&self) -> Vec<&str> {
        std::iter::once(TIME_COLUMN)
            .chain(self.attractions.iter().map(String::as_str))
            .collect()
    }

    /// Project a snapshot onto this schema: a missing attraction becomes an
    /// empty cell, an attraction not in the schema is dropped.
    pub fn project(&self, time: &str, snapshot: &AttractionSnapshot) -> Vec<String> {
        std::iter::once(time.to_string())
            .chain(
                self.attractions
                    .iter()
                    .map(|name| snapshot.get(name).unwrap_or_default().to_string()),
            )
            .collect()
    }
}

/// File name of the ledger for `park` on `date`, e.g.
/// `20250314_all_tdl_wait_times.csv`.
pub fn ledger_file_name(park: ParkIdentity, date: NaiveDate) -> String {
    format!("{}_all_{}_wait_times.csv", date.format("%Y%m%d"), park.code())
}

/// Append-only CSV persistence, one file per (day, park).
///
/// The header is written once from the first snapshot of the day and never
/// rewritten. Every append opens the file, writes one row and closes it.
#[derive(Debug)]
pub struct CsvLedger {
    dir: PathBuf,
    schemas: HashMap<(NaiveDate, ParkIdentity), LedgerSchema>,
}

impl CsvLedger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            schemas: HashMap::new(),
        }
    }

    pub fn path_for(&self, park: ParkIdentity, date: NaiveDate) -> PathBuf {
        self.dir.join(ledger_file_name(park, date))
    }

    /// Create the day's file with header `time,<names...>` if it does not
    /// exist yet. An existing file is left untouched and its header becomes
    /// the schema, whatever `snapshot` contains.
    pub fn ensure_header(
        &mut self,
        park: ParkIdentity,
        snapshot: &AttractionSnapshot,
        date: NaiveDate,
    ) -> Result<&LedgerSchema, LedgerError> {
        let key = (date, park);
        // Earlier days' files are closed for good once a later day is seen.
        self.schemas.retain(|(day, _), _| *day >= date);
        if !self.schemas.contains_key(&key) {
            let path = self.path_for(park, date);
            let schema = if path.exists() {
                read_schema(&path)?
            } else {
                let schema = LedgerSchema::from_snapshot(snapshot);
                create_with_header(&self.dir, &path, &schema)?;
                tracing::info!(path = %path.display(), columns = schema.attractions.len() + 1, "Created CSV ledger");
                schema
            };
            self.schemas.insert(key, schema);
        }
        self.schemas
            .get(&key)
            .ok_or_else(|| LedgerError::MissingHeader(self.path_for(park, date)))
    }

    /// Append one row stamped `HH:MM` from `now`.
    ///
    /// Returns `Ok(false)` without touching the file when `snapshot` is empty.
    pub fn append(
        &mut self,
        park: ParkIdentity,
        snapshot: &AttractionSnapshot,
        now: NaiveDateTime,
    ) -> Result<bool, LedgerError> {
        if snapshot.is_empty() {
            tracing::warn!(park = %park, "No data to save");
            return Ok(false);
        }

        let date = now.date();
        let path = self.path_for(park, date);
        let schema = match self.schemas.get(&(date, park)) {
            Some(schema) => schema.clone(),
            None if path.exists() => {
                let schema = read_schema(&path)?;
                self.schemas.insert((date, park), schema.clone());
                schema
            }
            None => return Err(LedgerError::MissingHeader(path)),
        };

        let dropped = snapshot
            .names()
            .filter(|name| !schema.attractions.iter().any(|a| a.as_str() == *name))
            .count();
        if dropped > 0 {
            tracing::debug!(park = %park, dropped, "Attractions not in today's header were not stored");
        }

        let time = now.format("%H:%M").to_string();
        let row = schema.project(&time, snapshot);

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
        let mut writer = csv_writer(file);
        writer
            .write_record(&row)
            .map_err(|source| LedgerError::Csv {
                path: path.clone(),
                source,
            })?;
        writer.flush().map_err(|source| LedgerError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), time = %time, "Appended row");
        Ok(true)
    }
}

fn csv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(w)
}

fn create_with_header(dir: &Path, path: &Path, schema: &LedgerSchema) -> Result<(), LedgerError> {
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv_writer(file);
    writer
        .write_record(schema.header())
        .map_err(|source| LedgerError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(io_err)
}

fn read_schema(path: &Path) -> Result<LedgerSchema, LedgerError> {
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut contents = Vec::new();
    fs::File::open(path)
        .map_err(io_err)?
        .read_to_end(&mut contents)
        .map_err(io_err)?;
    let body = contents.strip_prefix(UTF8_BOM).unwrap_or(&contents[..]);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);
    let mut header = csv::StringRecord::new();
    let found = reader
        .read_record(&mut header)
        .map_err(|source| LedgerError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    if !found {
        return Err(LedgerError::MissingHeader(path.to_path_buf()));
    }
    Ok(LedgerSchema::from_header(&header))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 42).unwrap()
    }

    fn snapshot(pairs: &[(&str, &str)]) -> AttractionSnapshot {
        pairs.iter().copied().collect()
    }

    fn read(path: &Path) -> String {
        String::from_utf8(fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            ledger_file_name(ParkIdentity::Land, date()),
            "20250314_all_tdl_wait_times.csv"
        );
        assert_eq!(
            ledger_file_name(ParkIdentity::Sea, date()),
            "20250314_all_tds_wait_times.csv"
        );
    }

    #[test]
    fn test_header_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let snap = snapshot(&[("Splash Mountain", "60"), ("Beast Castle", "90")]);

        ledger.ensure_header(ParkIdentity::Land, &snap, date()).unwrap();
        assert!(ledger.append(ParkIdentity::Land, &snap, at(10, 15)).unwrap());

        let contents = read(&ledger.path_for(ParkIdentity::Land, date()));
        assert_eq!(
            contents,
            "\u{FEFF}time,Splash Mountain,Beast Castle\r\n10:15,60,90\r\n"
        );
    }

    #[test]
    fn test_ensure_header_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let first = snapshot(&[("A", "5"), ("B", "10")]);
        let second = snapshot(&[("C", "15"), ("B", "20"), ("A", "25")]);

        ledger.ensure_header(ParkIdentity::Sea, &first, date()).unwrap();
        let path = ledger.path_for(ParkIdentity::Sea, date());
        let before = read(&path);

        let schema = ledger.ensure_header(ParkIdentity::Sea, &second, date()).unwrap();
        assert_eq!(schema.attractions(), ["A", "B"]);
        assert_eq!(read(&path), before);

        // A fresh ledger over the same directory reads the header back.
        let mut restarted = CsvLedger::new(dir.path());
        let schema = restarted.ensure_header(ParkIdentity::Sea, &second, date()).unwrap();
        assert_eq!(schema.attractions(), ["A", "B"]);
        assert_eq!(read(&path), before);
    }

    #[test]
    fn test_rows_projected_onto_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        ledger
            .ensure_header(ParkIdentity::Land, &snapshot(&[("A", "5"), ("B", "10")]), date())
            .unwrap();

        // Reordered, one missing, one new.
        let later = snapshot(&[("New Ride", "45"), ("B", "20")]);
        ledger.ensure_header(ParkIdentity::Land, &later, date()).unwrap();
        ledger.append(ParkIdentity::Land, &later, at(11, 0)).unwrap();

        let contents = read(&ledger.path_for(ParkIdentity::Land, date()));
        assert_eq!(contents, "\u{FEFF}time,A,B\r\n11:00,,20\r\n");
    }

    #[test]
    fn test_empty_snapshot_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let snap = snapshot(&[("A", "5")]);
        ledger.ensure_header(ParkIdentity::Land, &snap, date()).unwrap();
        ledger.append(ParkIdentity::Land, &snap, at(9, 0)).unwrap();

        let path = ledger.path_for(ParkIdentity::Land, date());
        let before = read(&path);
        assert!(!ledger
            .append(ParkIdentity::Land, &AttractionSnapshot::new(), at(9, 5))
            .unwrap());
        assert_eq!(read(&path), before);
        assert_eq!(before.lines().count(), 2);
    }

    #[test]
    fn test_append_without_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let err = ledger
            .append(ParkIdentity::Land, &snapshot(&[("A", "5")]), at(9, 0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingHeader(_)));
    }

    #[test]
    fn test_multibyte_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let snap = snapshot(&[("美女と野獣“魔法のものがたり”", "90"), ("Soarin', Fantastic, Flight", "案内終了")]);
        ledger.ensure_header(ParkIdentity::Sea, &snap, date()).unwrap();
        ledger.append(ParkIdentity::Sea, &snap, at(20, 5)).unwrap();

        let contents = read(&ledger.path_for(ParkIdentity::Sea, date()));
        assert_eq!(
            contents,
            "\u{FEFF}time,美女と野獣“魔法のものがたり”,\"Soarin', Fantastic, Flight\"\r\n20:05,90,案内終了\r\n"
        );
    }

    #[test]
    fn test_new_day_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let snap = snapshot(&[("A", "5")]);
        let tomorrow = date().succ_opt().unwrap();

        ledger.ensure_header(ParkIdentity::Land, &snap, date()).unwrap();
        ledger.ensure_header(ParkIdentity::Land, &snap, tomorrow).unwrap();

        assert!(ledger.path_for(ParkIdentity::Land, date()).exists());
        assert!(ledger.path_for(ParkIdentity::Land, tomorrow).exists());
    }

    #[test]
    fn test_past_days_dropped_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = CsvLedger::new(dir.path());
        let snap = snapshot(&[("A", "5")]);
        let mut day = date();
        for _ in 0..30 {
            ledger.ensure_header(ParkIdentity::Land, &snap, day).unwrap();
            ledger.ensure_header(ParkIdentity::Sea, &snap, day).unwrap();
            day = day.succ_opt().unwrap();
        }

        assert_eq!(ledger.schemas.len(), 2);
        let last = day.pred_opt().unwrap();
        assert!(ledger.schemas.keys().all(|(d, _)| *d == last));
    }
}
