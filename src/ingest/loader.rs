use crate::ingest::error::IngestError;
use crate::types::reading::Reading;
use async_compression::tokio::bufread::GzipDecoder;
use log::{debug, info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::{fs, task};
use ::zip::ZipArchive;

pub const COL_STATION_ID: &str = "station_id";
pub const COL_DATE: &str = "date";
pub const COL_TEMPERATURE: &str = "temperature_c";

/// Compressed forms a readings CSV can be shipped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Gzip,
    Zip,
}

impl ArchiveFormat {
    fn from_path(path: &Path) -> Option<ArchiveFormat> {
        match path.extension()?.to_str()? {
            "gz" => Some(ArchiveFormat::Gzip),
            "zip" => Some(ArchiveFormat::Zip),
            _ => None,
        }
    }
}

/// State of the extracted copy of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extracted {
    Missing,
    Stale,
    Fresh,
}

/// Reads temperature readings from CSV files, plain or compressed.
///
/// The CSV must have a header row containing `station_id`, `date` and
/// `temperature_c`; other columns are ignored. Rows are returned in file order.
///
/// Compressed files (`*.gz`, or a `*.zip` holding a `.csv` entry) are first
/// extracted next to the archive, or into the directory given to
/// [`ReadingLoader::with_extract_dir`]. An extracted file is reused until the
/// archive is modified after it.
#[derive(Debug, Clone, Default)]
pub struct ReadingLoader {
    extract_dir: Option<PathBuf>,
}

impl ReadingLoader {
    pub fn new() -> ReadingLoader {
        ReadingLoader::default()
    }

    pub fn with_extract_dir(extract_dir: &Path) -> ReadingLoader {
        ReadingLoader {
            extract_dir: Some(extract_dir.to_path_buf()),
        }
    }

    /// Loads readings from `path`, extracting it first if it ends in `.gz` or `.zip`.
    pub async fn load(&self, path: &Path) -> Result<Vec<Reading>, IngestError> {
        if ArchiveFormat::from_path(path).is_some() {
            self.load_compressed(path).await
        } else {
            self.load_csv(path).await
        }
    }

    /// Extracts a compressed CSV (unless an up to date copy exists) and loads it.
    ///
    /// Archives ending in `.zip` are read as zip files, anything else as gzip.
    pub async fn load_compressed(&self, archive: &Path) -> Result<Vec<Reading>, IngestError> {
        let csv_path = self.extracted_path(archive);

        match Self::extracted_state(archive, &csv_path).await {
            Extracted::Fresh => info!(
                "Using previously extracted {:?} for archive {:?}",
                csv_path, archive
            ),
            state => {
                if state == Extracted::Stale {
                    info!(
                        "Archive {:?} changed since {:?} was extracted, extracting again",
                        archive, csv_path
                    );
                } else {
                    warn!(
                        "No extracted copy of {:?} found, extracting to {:?}",
                        archive, csv_path
                    );
                }
                match ArchiveFormat::from_path(archive) {
                    Some(ArchiveFormat::Zip) => Self::extract_zip(archive, &csv_path).await?,
                    _ => Self::extract_gzip(archive, &csv_path).await?,
                }
            }
        }

        self.load_csv(&csv_path).await
    }

    /// Parses a CSV file of readings on a blocking task.
    pub async fn load_csv(&self, path: &Path) -> Result<Vec<Reading>, IngestError> {
        info!("Starting to read: {:?}", path);
        let path_buf = path.to_path_buf();
        let readings = task::spawn_blocking(move || Self::read_csv(&path_buf)).await??;
        info!(
            "Finished reading {} readings from: {:?}",
            readings.len(),
            path
        );
        Ok(readings)
    }

    fn extracted_path(&self, archive: &Path) -> PathBuf {
        // "data.csv.gz" -> "data.csv"
        let extracted = archive.with_extension("");
        match (&self.extract_dir, extracted.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => extracted,
        }
    }

    /// An extracted copy is stale when the archive was modified after it. If
    /// either time is unavailable (the archive was removed, say) the copy is
    /// used as is.
    async fn extracted_state(archive: &Path, csv_path: &Path) -> Extracted {
        let Ok(extracted) = fs::metadata(csv_path).await else {
            return Extracted::Missing;
        };
        let archive_modified = fs::metadata(archive).await.and_then(|m| m.modified());
        match (archive_modified, extracted.modified()) {
            (Ok(archive_time), Ok(extracted_time)) if archive_time > extracted_time => {
                Extracted::Stale
            }
            _ => Extracted::Fresh,
        }
    }

    /// Creates a temporary file next to `target`. Extraction writes into it and
    /// only renames it onto `target` once complete, so a failed or interrupted
    /// extraction never leaves a truncated CSV behind.
    fn staging_file(target: &Path) -> Result<NamedTempFile, IngestError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .and_then(|_| NamedTempFile::new_in(dir))
            .map_err(|e| IngestError::ExtractWrite(dir.to_path_buf(), e))
    }

    async fn extract_gzip(archive: &Path, target: &Path) -> Result<(), IngestError> {
        let file = fs::File::open(archive)
            .await
            .map_err(|e| IngestError::Io(archive.to_path_buf(), e))?;
        let mut decoder = GzipDecoder::new(BufReader::new(file));

        let (staged, staged_path) = Self::staging_file(target)?.into_parts();
        let mut staged = fs::File::from_std(staged);
        let bytes = tokio::io::copy(&mut decoder, &mut staged)
            .await
            .map_err(|e| IngestError::Decompress(archive.to_path_buf(), e))?;
        staged
            .flush()
            .await
            .map_err(|e| IngestError::ExtractWrite(target.to_path_buf(), e))?;
        drop(staged);

        staged_path
            .persist(target)
            .map_err(|e| IngestError::ExtractWrite(target.to_path_buf(), e.error))?;
        info!(
            "Decompressed {} bytes from {:?} to {:?}",
            bytes, archive, target
        );
        Ok(())
    }

    async fn extract_zip(archive: &Path, target: &Path) -> Result<(), IngestError> {
        let archive = archive.to_path_buf();
        let target = target.to_path_buf();
        task::spawn_blocking(move || Self::extract_zip_entry(&archive, &target)).await?
    }

    /// Copies the first `.csv` entry of a zip archive to `target`.
    fn extract_zip_entry(archive: &Path, target: &Path) -> Result<(), IngestError> {
        let file = std::fs::File::open(archive)
            .map_err(|e| IngestError::Io(archive.to_path_buf(), e))?;
        let zip_error = |source| IngestError::Archive {
            path: archive.to_path_buf(),
            source,
        };
        let mut zip = ZipArchive::new(file).map_err(zip_error)?;

        let name = zip
            .file_names()
            .find(|name| name.ends_with(".csv"))
            .map(str::to_owned)
            .ok_or_else(|| IngestError::MissingArchiveEntry(archive.to_path_buf()))?;
        let mut entry = zip.by_name(&name).map_err(zip_error)?;

        let mut staged = Self::staging_file(target)?;
        let bytes = std::io::copy(&mut entry, &mut staged)
            .map_err(|e| IngestError::Decompress(archive.to_path_buf(), e))?;
        staged
            .persist(target)
            .map_err(|e| IngestError::ExtractWrite(target.to_path_buf(), e.error))?;
        info!(
            "Extracted {} bytes of {:?} from {:?} to {:?}",
            bytes, name, archive, target
        );
        Ok(())
    }

    fn read_csv(path: &Path) -> Result<Vec<Reading>, IngestError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| IngestError::CsvParse {
                path: path.to_path_buf(),
                source: e,
            })?
            .finish()
            .map_err(|e| IngestError::CsvParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!("Read frame of shape {:?} from {:?}", df.shape(), path);

        let station_ids = Self::station_ids(&df, path)?;
        let date_col = Self::cast_column(&df, path, COL_DATE, DataType::Float64)?;
        let temp_col = Self::cast_column(&df, path, COL_TEMPERATURE, DataType::Float64)?;

        let dates = date_col
            .f64()
            .map_err(|e| Self::type_error(path, COL_DATE, "numbers", e))?;
        let temperatures = temp_col
            .f64()
            .map_err(|e| Self::type_error(path, COL_TEMPERATURE, "numbers", e))?;

        let invalid = |row: usize, column: &'static str| IngestError::InvalidValue {
            path: path.to_path_buf(),
            row: row + 1,
            column,
        };

        station_ids
            .into_iter()
            .zip(dates.into_iter())
            .zip(temperatures.into_iter())
            .enumerate()
            .map(|(row, ((station_id, date), temperature))| -> Result<Reading, IngestError> {
                Ok(Reading::new(
                    station_id.ok_or_else(|| invalid(row, COL_STATION_ID))?,
                    date.ok_or_else(|| invalid(row, COL_DATE))?,
                    temperature.ok_or_else(|| invalid(row, COL_TEMPERATURE))?,
                ))
            })
            .collect()
    }

    /// Station ids, with `None` for values that are missing or not whole numbers.
    ///
    /// Integer columns are cast exactly. Any other column is read as floats so
    /// that an id like `68.7` is rejected instead of truncated to `68`.
    fn station_ids(df: &DataFrame, path: &Path) -> Result<Vec<Option<i64>>, IngestError> {
        let column = Self::required_column(df, path, COL_STATION_ID)?;
        if column.dtype().is_integer() {
            let cast = Self::cast_column(df, path, COL_STATION_ID, DataType::Int64)?;
            let ids = cast
                .i64()
                .map_err(|e| Self::type_error(path, COL_STATION_ID, "integers", e))?;
            return Ok(ids.into_iter().collect());
        }

        let cast = Self::cast_column(df, path, COL_STATION_ID, DataType::Float64)?;
        let ids = cast
            .f64()
            .map_err(|e| Self::type_error(path, COL_STATION_ID, "integers", e))?;
        Ok(ids
            .into_iter()
            .map(|id| id.and_then(whole_station_id))
            .collect())
    }

    fn required_column<'a>(
        df: &'a DataFrame,
        path: &Path,
        name: &str,
    ) -> Result<&'a Column, IngestError> {
        df.column(name).map_err(|_| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
    }

    /// Looks up a column and casts it; values that cannot be cast become nulls.
    fn cast_column(
        df: &DataFrame,
        path: &Path,
        name: &str,
        dtype: DataType,
    ) -> Result<Column, IngestError> {
        Self::required_column(df, path, name)?
            .cast(&dtype)
            .map_err(|e| Self::type_error(path, name, "numbers", e))
    }

    fn type_error(
        path: &Path,
        column: &str,
        expected: &'static str,
        source: PolarsError,
    ) -> IngestError {
        IngestError::ColumnType {
            path: path.to_path_buf(),
            column: column.to_string(),
            expected,
            source,
        }
    }
}

fn whole_station_id(id: f64) -> Option<i64> {
    let in_range = id >= i64::MIN as f64 && id < i64::MAX as f64;
    (in_range && id.fract() == 0.0).then_some(id as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::write::GzipEncoder;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    const SAMPLE: &str = "station_id,date,temperature_c\n\
        68,2000.375,10.2\n\
        81,2000.375,20.5\n\
        68,2000.542,-4.75\n\
        81,2000.542,25\n";

    async fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzipEncoder::new(Vec::new());
        encoder.write_all(bytes).await.unwrap();
        encoder.shutdown().await.unwrap();
        encoder.into_inner()
    }

    fn zipped(entries: &[(&str, &str)]) -> Vec<u8> {
        use std::io::Write;

        let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, ::zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Marks `path` as modified a minute from now.
    fn touch_later(path: &Path) -> std::io::Result<()> {
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(60);
        std::fs::File::options()
            .write(true)
            .open(path)?
            .set_modified(later)
    }

    #[tokio::test]
    async fn test_load_csv() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("readings.csv");
        std::fs::write(&path, SAMPLE)?;

        let readings = ReadingLoader::new().load(&path).await?;
        assert_eq!(
            readings,
            vec![
                Reading::new(68, 2000.375, 10.2),
                Reading::new(81, 2000.375, 20.5),
                Reading::new(68, 2000.542, -4.75),
                Reading::new(81, 2000.542, 25.0),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_extra_columns_and_order_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("reordered.csv");
        std::fs::write(
            &path,
            "temperature_c,note,station_id,date\n1.5,a,7,3.25\n-2.0,b,9,3.5\n",
        )?;

        let readings = ReadingLoader::new().load_csv(&path).await?;
        assert_eq!(
            readings,
            vec![Reading::new(7, 3.25, 1.5), Reading::new(9, 3.5, -2.0)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_header_only_file_has_no_readings() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "station_id,date,temperature_c\n")?;

        let readings = ReadingLoader::new().load_csv(&path).await?;
        assert!(readings.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_column() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("no_temp.csv");
        std::fs::write(&path, "station_id,date\n1,2000.1\n")?;

        let result = ReadingLoader::new().load_csv(&path).await;
        match result {
            Err(IngestError::MissingColumn { column, .. }) => assert_eq!(column, COL_TEMPERATURE),
            other => panic!("Expected MissingColumn, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_non_numeric_value() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("bad_value.csv");
        std::fs::write(
            &path,
            "station_id,date,temperature_c\n1,2000.1,3.0\n1,2000.2,warm\n",
        )?;

        let result = ReadingLoader::new().load_csv(&path).await;
        match result {
            Err(IngestError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_TEMPERATURE);
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fractional_station_id_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("fractional_id.csv");
        std::fs::write(
            &path,
            "station_id,date,temperature_c\n68,1.0,2.0\n68.7,2.0,3.0\n",
        )?;

        let result = ReadingLoader::new().load_csv(&path).await;
        match result {
            Err(IngestError::InvalidValue { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, COL_STATION_ID);
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_whole_float_station_ids_accepted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("float_ids.csv");
        std::fs::write(
            &path,
            "station_id,date,temperature_c\n68.0,1.0,2.0\n81.0,2.0,3.0\n",
        )?;

        let readings = ReadingLoader::new().load_csv(&path).await?;
        assert_eq!(
            readings,
            vec![Reading::new(68, 1.0, 2.0), Reading::new(81, 2.0, 3.0)]
        );
        Ok(())
    }

    #[test]
    fn test_whole_station_id() {
        assert_eq!(whole_station_id(68.0), Some(68));
        assert_eq!(whole_station_id(-3.0), Some(-3));
        assert_eq!(whole_station_id(68.7), None);
        assert_eq!(whole_station_id(f64::NAN), None);
        assert_eq!(whole_station_id(f64::INFINITY), None);
        assert_eq!(whole_station_id(1e30), None);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = ReadingLoader::new()
            .load_csv(Path::new("/definitely/not/here.csv"))
            .await;
        assert!(matches!(result, Err(IngestError::CsvParse { .. })));
    }

    #[tokio::test]
    async fn test_load_compressed_extracts_once() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("data.csv.gz");
        std::fs::write(&archive, gzip(SAMPLE.as_bytes()).await)?;

        let loader = ReadingLoader::new();
        let readings = loader.load(&archive).await?;
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[2], Reading::new(68, 2000.542, -4.75));

        let extracted = dir.path().join("data.csv");
        assert!(extracted.exists());
        let extracted_at = std::fs::metadata(&extracted)?.modified()?;

        // An unchanged archive is not extracted again.
        assert_eq!(loader.load(&archive).await?, readings);
        assert_eq!(std::fs::metadata(&extracted)?.modified()?, extracted_at);

        // Without the archive the extracted file is still used.
        std::fs::remove_file(&archive)?;
        let again = loader.load_compressed(&archive).await?;
        assert_eq!(again, readings);
        Ok(())
    }

    #[tokio::test]
    async fn test_replaced_archive_is_extracted_again() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("data.csv.gz");
        let loader = ReadingLoader::new();

        std::fs::write(
            &archive,
            gzip(b"station_id,date,temperature_c\n1,1.0,5.0\n").await,
        )?;
        let first = loader.load(&archive).await?;
        assert_eq!(first, vec![Reading::new(1, 1.0, 5.0)]);

        std::fs::write(
            &archive,
            gzip(b"station_id,date,temperature_c\n2,1.0,6.0\n3,1.0,7.0\n").await,
        )?;
        touch_later(&archive)?;

        let second = loader.load(&archive).await?;
        assert_eq!(
            second,
            vec![Reading::new(2, 1.0, 6.0), Reading::new(3, 1.0, 7.0)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_load_zip_archive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("data.csv.zip");
        std::fs::write(
            &archive,
            zipped(&[("README.txt", "readings"), ("data.csv", SAMPLE)]),
        )?;

        let loader = ReadingLoader::new();
        let readings = loader.load(&archive).await?;
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[3], Reading::new(81, 2000.542, 25.0));
        assert!(dir.path().join("data.csv").exists());

        std::fs::remove_file(&archive)?;
        assert_eq!(loader.load(&archive).await?, readings);
        Ok(())
    }

    #[tokio::test]
    async fn test_zip_without_csv_entry() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("data.csv.zip");
        std::fs::write(&archive, zipped(&[("notes.txt", "nothing here")]))?;

        let result = ReadingLoader::new().load(&archive).await;
        assert!(matches!(result, Err(IngestError::MissingArchiveEntry(_))));
        assert!(!dir.path().join("data.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_extract_dir() -> Result<(), Box<dyn std::error::Error>> {
        let archive_dir = tempdir()?;
        let extract_dir = tempdir()?;
        let archive = archive_dir.path().join("data.csv.gz");
        std::fs::write(&archive, gzip(SAMPLE.as_bytes()).await)?;

        let loader = ReadingLoader::with_extract_dir(&extract_dir.path().join("nested"));
        let readings = loader.load(&archive).await?;
        assert_eq!(readings.len(), 4);
        assert!(extract_dir.path().join("nested").join("data.csv").exists());
        assert!(!archive_dir.path().join("data.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_sample_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample.csv");
        let readings = ReadingLoader::new().load(&path).await?;
        assert_eq!(readings.len(), 18);

        let minimum = crate::find_minimum_temperature(&readings)?;
        assert_eq!(minimum.station_id, 68);
        assert_eq!(minimum.temperature_c, -4.5);

        // The 5000.0 spike of station 81 lies outside the window.
        assert_eq!(crate::get_station_with_most_fluctuation(&readings), 81);
        assert_eq!(
            crate::get_station_with_most_fluctuation_time_bound(&readings, 2000.001, 2000.456),
            68
        );
        assert_eq!(
            crate::get_station_with_most_fluctuation_time_bound(&readings, 2000.001, "hello"),
            -1
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_archive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("broken.csv.gz");
        std::fs::write(&archive, b"this is not gzip")?;

        let result = ReadingLoader::new().load(&archive).await;
        assert!(matches!(result, Err(IngestError::Decompress(..))));
        assert!(!dir.path().join("broken.csv").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_truncated_archive_leaves_no_partial_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let archive = dir.path().join("data.csv.gz");
        let rows: String = (0..5_000)
            .map(|i| format!("{},{}.5,{}.25\n", i % 7, i, i % 40))
            .collect();
        let compressed = gzip(format!("station_id,date,temperature_c\n{}", rows).as_bytes()).await;
        std::fs::write(&archive, &compressed[..compressed.len() / 2])?;

        let result = ReadingLoader::new().load(&archive).await;
        assert!(matches!(result, Err(IngestError::Decompress(..))));
        // Only the archive remains: the staged file was discarded.
        assert!(!dir.path().join("data.csv").exists());
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
