//! # Capture Date Extraction Module
//!
//! Questo modulo estrae anno e mese di scatto da foto e video.
//!
//! ## Responsabilità:
//! - Definisce `CaptureDate` (anno + mese) prodotto una sola volta per file
//! - Definisce il trait `DateStrategy` con due implementazioni concrete
//! - Seleziona la strategia esplicitamente in base a `MediaKind`
//! - Trasforma ogni fallimento in una data assente (bucket `undated`)
//!
//! ## Strategie:
//! - `EmbeddedExifStrategy`: decodifica in-process del blocco EXIF (kamadak-exif),
//!   veloce e senza dipendenze esterne, ma non copre i container video
//! - `ExifToolStrategy`: lancia `exiftool -<Tag> <file>` come sottoprocesso e
//!   interpreta la riga `<label>: <YYYY:MM:DD HH:MM:SS>`; universale ma costa
//!   uno spawn per file
//!
//! ## Fallback:
//! - Foto: strategia embedded; se la decodifica stessa fallisce (container non
//!   leggibile) si interroga exiftool, se abilitato
//! - Foto con EXIF leggibile ma senza tag data: nessun fallback, data assente
//! - Video: sempre exiftool
//! - Non supportati: sempre data assente
//!
//! ## Esempio:
//! ```rust,ignore
//! let extractor = DateExtractor::new(&config);
//! match extractor.extract(&path, MediaKind::Photo).await {
//!     Some(date) => println!("{}/{:02}", date.year, date.month),
//!     None => println!("undated"),
//! }
//! ```

use crate::{
    config::{Config, PhotoStrategy},
    error::OrganizeError,
    file_manager::MediaKind,
};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timestamp layout printed by exiftool
pub const TOOL_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Tags tried, in order, by the embedded decoder
const EMBEDDED_DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Year and month a file was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureDate {
    pub year: i32,
    pub month: u32,
}

impl CaptureDate {
    /// Returns `None` for a month outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl std::fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// A way of reading the capture date out of a file.
///
/// `Err` means the strategy could not run or could not decode the file at all;
/// `Ok(None)` means it ran but found no usable date.
#[async_trait]
pub trait DateStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError>;
}

/// In-process EXIF decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedExifStrategy;

#[async_trait]
impl DateStrategy for EmbeddedExifStrategy {
    fn name(&self) -> &'static str {
        "embedded-exif"
    }

    async fn extract(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_embedded_date(&owned))
            .await
            .map_err(|e| OrganizeError::extraction(path, format!("decoder task failed: {}", e)))?
    }
}

fn read_embedded_date(path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        // Readable container without an EXIF block
        Err(exif::Error::NotFound(container)) => {
            debug!("{} has no EXIF data ({})", path.display(), container);
            return Ok(None);
        }
        Err(e) => return Err(OrganizeError::extraction(path, e.to_string())),
    };

    for tag in EMBEDDED_DATE_TAGS {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        if let Value::Ascii(ref values) = field.value {
            let parsed = values
                .first()
                .and_then(|raw| exif::DateTime::from_ascii(raw).ok())
                .and_then(|dt| CaptureDate::new(i32::from(dt.year), u32::from(dt.month)));
            if let Some(date) = parsed {
                debug!("{} {} -> {}", path.display(), tag, date);
                return Ok(Some(date));
            }
        }
    }

    Ok(None)
}

/// External metadata tool, run once per file
#[derive(Debug, Clone)]
pub struct ExifToolStrategy {
    command: String,
    extra_args: Vec<String>,
    tag: String,
}

impl ExifToolStrategy {
    pub fn new(command: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
            tag: tag.into(),
        }
    }

    /// Arguments placed before the tag query
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        let command = crate::platform::PlatformCommands::instance()
            .get_command(&config.exiftool_command)
            .to_string();
        Self::new(command, config.date_tag.clone()).with_args(config.exiftool_args.clone())
    }
}

#[async_trait]
impl DateStrategy for ExifToolStrategy {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    async fn extract(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
        let output = Command::new(&self.command)
            .args(&self.extra_args)
            .arg(format!("-{}", self.tag))
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                OrganizeError::extraction(path, format!("failed to execute {}: {}", self.command, e))
            })?;

        if !output.status.success() {
            return Err(OrganizeError::extraction(
                path,
                format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(parse_tool_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Find the first `<label>: <YYYY:MM:DD HH:MM:SS>` line in the tool output
pub fn parse_tool_output(stdout: &str) -> Option<CaptureDate> {
    stdout.lines().find_map(parse_tool_line)
}

fn parse_tool_line(line: &str) -> Option<CaptureDate> {
    let (_label, value) = line.trim().split_once(": ")?;
    let timestamp = NaiveDateTime::parse_from_str(value.trim(), TOOL_DATE_FORMAT).ok()?;
    CaptureDate::new(timestamp.year(), timestamp.month())
}

/// Picks a strategy by media kind and applies the photo fallback
#[derive(Clone)]
pub struct DateExtractor {
    photo: Arc<dyn DateStrategy>,
    video: Arc<dyn DateStrategy>,
    fallback: Option<Arc<dyn DateStrategy>>,
}

impl DateExtractor {
    pub fn new(config: &Config) -> Self {
        let tool: Arc<dyn DateStrategy> = Arc::new(ExifToolStrategy::from_config(config));

        match config.photo_strategy {
            PhotoStrategy::Embedded => Self {
                photo: Arc::new(EmbeddedExifStrategy),
                video: tool.clone(),
                fallback: config.exiftool_fallback.then_some(tool),
            },
            PhotoStrategy::ExifTool => Self {
                photo: tool.clone(),
                video: tool,
                fallback: None,
            },
        }
    }

    pub fn with_strategies(
        photo: Arc<dyn DateStrategy>,
        video: Arc<dyn DateStrategy>,
        fallback: Option<Arc<dyn DateStrategy>>,
    ) -> Self {
        Self {
            photo,
            video,
            fallback,
        }
    }

    /// Capture date of `path`, or `None` when it cannot be determined
    pub async fn extract(&self, path: &Path, kind: MediaKind) -> Option<CaptureDate> {
        let result = match kind {
            MediaKind::Unsupported => return None,
            MediaKind::Photo => self.extract_photo(path).await,
            MediaKind::Video => self.video.extract(path).await,
        };

        match result {
            Ok(Some(date)) => Some(date),
            Ok(None) => {
                warn!("No capture date found for {} {}", kind, path.display());
                None
            }
            Err(e) => {
                warn!("Failed to get date taken for {} {}: {}", kind, path.display(), e);
                None
            }
        }
    }

    async fn extract_photo(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
        match self.photo.extract(path).await {
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    debug!(
                        "{} could not decode {} ({}), trying {}",
                        self.photo.name(),
                        path.display(),
                        e,
                        fallback.name()
                    );
                    fallback.extract(path).await
                }
                None => Err(e),
            },
            decoded => decoded,
        }
    }
}

/// Build a minimal JPEG carrying only an EXIF `DateTimeOriginal`
#[cfg(test)]
pub(crate) fn jpeg_with_capture_date(timestamp: &str) -> Vec<u8> {
    let mut value = timestamp.as_bytes().to_vec();
    value.push(0);

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 at 8: one entry pointing at the Exif IFD
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD at 26: DateTimeOriginal, value stored at 44
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(value.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&value);

    wrap_in_jpeg(&tiff)
}

#[cfg(test)]
fn wrap_in_jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Scriptable strategy for tests
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy)]
    pub enum FakeOutcome {
        Date(CaptureDate),
        NoTag,
        Broken,
    }

    pub struct FakeStrategy {
        outcome: FakeOutcome,
        calls: AtomicUsize,
    }

    impl FakeStrategy {
        pub fn new(outcome: FakeOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DateStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn extract(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                FakeOutcome::Date(date) => Ok(Some(date)),
                FakeOutcome::NoTag => Ok(None),
                FakeOutcome::Broken => Err(OrganizeError::extraction(path, "broken")),
            }
        }
    }

    /// Answers with canned tool stdout, looked up by file name
    pub struct CannedToolOutput {
        pub outputs: Vec<(PathBuf, String)>,
    }

    #[async_trait]
    impl DateStrategy for CannedToolOutput {
        fn name(&self) -> &'static str {
            "canned-exiftool"
        }

        async fn extract(&self, path: &Path) -> Result<Option<CaptureDate>, OrganizeError> {
            let name = path.file_name().map(PathBuf::from).unwrap_or_default();
            match self.outputs.iter().find(|(file, _)| *file == name) {
                Some((_, stdout)) => Ok(parse_tool_output(stdout)),
                None => Err(OrganizeError::extraction(path, "exiftool exited with 1")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FakeOutcome, FakeStrategy};
    use super::*;
    use tempfile::TempDir;

    fn date(year: i32, month: u32) -> CaptureDate {
        CaptureDate::new(year, month).unwrap()
    }

    #[test]
    fn test_capture_date_month_range() {
        assert!(CaptureDate::new(2023, 0).is_none());
        assert!(CaptureDate::new(2023, 13).is_none());
        assert_eq!(date(2023, 4).to_string(), "2023-04");
    }

    #[test]
    fn test_parse_tool_output() {
        let stdout = "Date/Time Original              : 2022:01:05 10:00:00\n";
        assert_eq!(parse_tool_output(stdout), Some(date(2022, 1)));

        assert_eq!(
            parse_tool_output("DateTimeOriginal: 2022:01:05 10:00:00"),
            Some(date(2022, 1))
        );
    }

    #[test]
    fn test_parse_tool_output_rejects_bad_input() {
        // no separator at all
        assert_eq!(parse_tool_output("2022:01:05 10:00:00"), None);
        // nothing after the separator
        assert_eq!(parse_tool_output("Date/Time Original : "), None);
        // wrong layout
        assert_eq!(parse_tool_output("Create Date : 2022-01-05 10:00:00"), None);
        assert_eq!(parse_tool_output("Create Date : 2022:01:05"), None);
        // timezone suffix does not match the exact layout
        assert_eq!(parse_tool_output("Create Date : 2022:01:05 10:00:00+02:00"), None);
        // exiftool placeholder for unset dates
        assert_eq!(parse_tool_output("Create Date : 0000:00:00 00:00:00"), None);
        assert_eq!(parse_tool_output(""), None);
    }

    #[test]
    fn test_parse_tool_output_uses_first_matching_line() {
        let stdout = "Warning : [minor] odd maker notes\nDate/Time Original : 2021:12:31 23:59:59\nDate/Time Original : 2020:06:01 00:00:00\n";
        assert_eq!(parse_tool_output(stdout), Some(date(2021, 12)));
    }

    #[tokio::test]
    async fn test_photo_uses_embedded_without_fallback() {
        let photo = FakeStrategy::new(FakeOutcome::Date(date(2023, 7)));
        let tool = FakeStrategy::new(FakeOutcome::Date(date(1999, 1)));
        let extractor = DateExtractor::with_strategies(photo.clone(), tool.clone(), Some(tool.clone()));

        let result = extractor.extract(Path::new("a.jpg"), MediaKind::Photo).await;
        assert_eq!(result, Some(date(2023, 7)));
        assert_eq!(photo.calls(), 1);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_tag_does_not_fall_back() {
        let photo = FakeStrategy::new(FakeOutcome::NoTag);
        let tool = FakeStrategy::new(FakeOutcome::Date(date(1999, 1)));
        let extractor = DateExtractor::with_strategies(photo.clone(), tool.clone(), Some(tool.clone()));

        assert_eq!(extractor.extract(Path::new("a.jpg"), MediaKind::Photo).await, None);
        assert_eq!(tool.calls(), 0);
    }

    /// SOI, a JFIF APP0 segment, EOI
    fn jfif_only_jpeg() -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
        jpeg.extend_from_slice(&16u16.to_be_bytes());
        jpeg.extend_from_slice(b"JFIF\0");
        jpeg.extend_from_slice(&[1, 1, 0, 0, 1, 0, 1, 0, 0]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    #[tokio::test]
    async fn test_jpeg_without_exif_block_does_not_fall_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("screenshot.jpg");
        std::fs::write(&path, jfif_only_jpeg()).unwrap();

        assert_eq!(EmbeddedExifStrategy.extract(&path).await.unwrap(), None);

        let tool = FakeStrategy::new(FakeOutcome::Date(date(1999, 1)));
        let extractor =
            DateExtractor::with_strategies(Arc::new(EmbeddedExifStrategy), tool.clone(), Some(tool.clone()));

        assert_eq!(extractor.extract(&path, MediaKind::Photo).await, None);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_decode_falls_back_to_tool() {
        let photo = FakeStrategy::new(FakeOutcome::Broken);
        let tool = FakeStrategy::new(FakeOutcome::Date(date(2019, 11)));
        let extractor = DateExtractor::with_strategies(photo.clone(), tool.clone(), Some(tool.clone()));

        let result = extractor.extract(Path::new("IMG_0001.CR3"), MediaKind::Photo).await;
        assert_eq!(result, Some(date(2019, 11)));
        assert_eq!(photo.calls(), 1);
        assert_eq!(tool.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_decode_without_fallback_is_absent() {
        let photo = FakeStrategy::new(FakeOutcome::Broken);
        let tool = FakeStrategy::new(FakeOutcome::Date(date(2019, 11)));
        let extractor = DateExtractor::with_strategies(photo.clone(), tool.clone(), None);

        assert_eq!(extractor.extract(Path::new("a.jpg"), MediaKind::Photo).await, None);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_video_and_unsupported_routing() {
        let photo = FakeStrategy::new(FakeOutcome::Date(date(2023, 7)));
        let tool = FakeStrategy::new(FakeOutcome::Date(date(2022, 1)));
        let extractor = DateExtractor::with_strategies(photo.clone(), tool.clone(), Some(tool.clone()));

        assert_eq!(
            extractor.extract(Path::new("b.mov"), MediaKind::Video).await,
            Some(date(2022, 1))
        );
        assert_eq!(extractor.extract(Path::new("c.txt"), MediaKind::Unsupported).await, None);
        assert_eq!(photo.calls(), 0);
        assert_eq!(tool.calls(), 1);
    }

    #[tokio::test]
    async fn test_embedded_strategy_reads_date() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_capture_date("2023:07:11 09:30:00")).unwrap();

        let result = EmbeddedExifStrategy.extract(&path).await.unwrap();
        assert_eq!(result, Some(date(2023, 7)));
    }

    #[tokio::test]
    async fn test_embedded_strategy_without_date_tag() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");

        // IFD0 with a lone Orientation entry
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II");
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&[1, 0, 0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        std::fs::write(&path, wrap_in_jpeg(&tiff)).unwrap();

        let result = EmbeddedExifStrategy.extract(&path).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_embedded_strategy_corrupt_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        assert!(EmbeddedExifStrategy.extract(&path).await.is_err());
        assert!(EmbeddedExifStrategy
            .extract(&temp_dir.path().join("missing.jpg"))
            .await
            .is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exiftool_strategy_parses_stdout() {
        // $1 is the tag query, $2 the file
        let tool = ExifToolStrategy::new("sh", "DateTimeOriginal").with_args([
            "-c",
            r#"[ "$1" = "-DateTimeOriginal" ] && [ -n "$2" ] && echo "Date/Time Original              : 2022:01:05 10:00:00""#,
            "sh",
        ]);
        let result = tool.extract(Path::new("b.mov")).await.unwrap();
        assert_eq!(result, Some(date(2022, 1)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exiftool_strategy_failures() {
        let failing = ExifToolStrategy::new("sh", "DateTimeOriginal")
            .with_args(["-c", "echo 'Error: File not found' >&2; exit 1", "sh"]);
        assert!(failing.extract(Path::new("b.mov")).await.is_err());

        let silent = ExifToolStrategy::new("sh", "DateTimeOriginal").with_args(["-c", "true", "sh"]);
        assert_eq!(silent.extract(Path::new("b.mov")).await.unwrap(), None);

        let missing = ExifToolStrategy::new("definitely-not-a-real-exiftool", "DateTimeOriginal");
        assert!(missing.extract(Path::new("b.mov")).await.is_err());
    }
}
