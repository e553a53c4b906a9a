//! CSV export of selected listings.
//!
//! The file always starts with the header row
//! `link,common,name,lowest_ask,avg_sale,hook_shot`, even when no records
//! were selected. Absent fields are written as empty cells. Output is UTF-8.

use crate::error::ExportError;
use crate::models::Record;
use crate::utils::date_stamp;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Where an export landed and how many data rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// `topshot_data_MMDDYYYY.csv` for the given date.
pub fn export_filename(date: NaiveDate) -> String {
    format!("topshot_data_{}.csv", date_stamp(date))
}

/// Serialize records to CSV bytes, header first.
pub fn to_csv_bytes(records: &[Record]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(Record::FIELDS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Write `records` to `dir/topshot_data_MMDDYYYY.csv`, replacing any file of that name.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), rows = records.len()))]
pub async fn export(
    records: &[Record],
    dir: &Path,
    date: NaiveDate,
) -> Result<ExportSummary, ExportError> {
    let bytes = to_csv_bytes(records)?;
    let path = dir.join(export_filename(date));

    info!(path = %path.display(), "Writing CSV");
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), "Wrote CSV export");

    Ok(ExportSummary {
        path,
        rows: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn sample() -> Vec<Record> {
        vec![
            Record {
                link: Some("https://www.nbatopshot.com/listings/p2p/1".into()),
                common: Some("Common".into()),
                name: Some("Luka Dončić".into()),
                lowest_ask: Some("$1,200".into()),
                avg_sale: Some("$9.50".into()),
                hook_shot: Some("Hook \"Shot\"".into()),
            },
            Record {
                name: Some("Luka Dončić".into()),
                ..Default::default()
            },
        ]
    }

    fn cells(record: &Record) -> Vec<&str> {
        [
            &record.link,
            &record.common,
            &record.name,
            &record.lowest_ask,
            &record.avg_sale,
            &record.hook_shot,
        ]
        .into_iter()
        .map(|f| f.as_deref().unwrap_or(""))
        .collect()
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename(date()), "topshot_data_03072024.csv");
    }

    #[tokio::test]
    async fn test_empty_export_writes_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let summary = export(&[], tmp.path(), date()).await.unwrap();

        assert_eq!(summary.rows, 0);
        assert_eq!(summary.path, tmp.path().join("topshot_data_03072024.csv"));
        let text = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(text, "link,common,name,lowest_ask,avg_sale,hook_shot\n");
    }

    #[tokio::test]
    async fn test_export_reads_back_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let records = sample();
        let summary = export(&records, tmp.path(), date()).await.unwrap();
        assert_eq!(summary.rows, 2);

        let mut reader = ::csv::Reader::from_path(&summary.path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, Record::FIELDS);

        let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), records.len());
        for (row, record) in rows.iter().zip(&records) {
            let got: Vec<&str> = row.iter().collect();
            assert_eq!(got, cells(record));
        }
    }

    #[tokio::test]
    async fn test_export_overwrites_same_day_file() {
        let tmp = tempfile::tempdir().unwrap();
        export(&sample(), tmp.path(), date()).await.unwrap();
        let summary = export(&[], tmp.path(), date()).await.unwrap();
        let text = std::fs::read_to_string(&summary.path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
