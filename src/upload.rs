//! Local file uploads.
//!
//! Paths handed to the dashboard are filtered to source and plain-text files,
//! read as UTF-8, and stamped with an id derived from the upload time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::diff::detect_language;
use crate::error::{Error, Result};

pub const CODE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "py", "java", "cpp", "c", "cs", "go", "rb", "php", "swift", "kt",
    "rs", "txt", "md",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub content: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
}

/// Files accepted from one upload, plus the paths that were passed over.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub files: Vec<UploadedFile>,
    pub skipped: Vec<PathBuf>,
}

#[must_use]
pub fn is_code_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CODE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// `uploaded-{millis}-{name}` with every non-alphanumeric character of the
/// name replaced by `-`.
#[must_use]
pub fn generate_file_id(name: &str, now: DateTime<Utc>) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("uploaded-{}-{slug}", now.timestamp_millis())
}

/// Read `path` as UTF-8 text.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_file_as_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| Error::NotText {
        path: path.to_path_buf(),
    })
}

/// Contents of a file outside the code list, when it reads as plain text:
/// valid UTF-8 with no NUL bytes.
fn read_plain_text(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.contains(&0) {
        return None;
    }
    String::from_utf8(bytes).ok()
}

/// Read every code or plain-text file in `paths`. Non-files and binary files
/// with unknown extensions are skipped; the first read failure of a code
/// file aborts the whole batch.
///
/// # Errors
///
/// Returns the first read error encountered.
pub fn process_paths(paths: &[PathBuf], now: DateTime<Utc>) -> Result<UploadBatch> {
    let mut batch = UploadBatch::default();

    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !path.is_file() {
            log::warn!("Skipping non-file path: {}", path.display());
            batch.skipped.push(path.clone());
            continue;
        }

        let content = if is_code_file(&name) {
            read_file_as_text(path)?
        } else if let Some(text) = read_plain_text(path) {
            log::debug!("Accepting {} as plain text", path.display());
            text
        } else {
            log::warn!("Skipping non-text file: {}", path.display());
            batch.skipped.push(path.clone());
            continue;
        };
        log::info!("Uploaded {} ({} bytes)", path.display(), content.len());
        batch.files.push(UploadedFile {
            id: generate_file_id(&name, now),
            language: detect_language(&name).to_string(),
            name,
            path: path.clone(),
            content,
            timestamp: now,
        });
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_736_087_400_000).unwrap()
    }

    #[test]
    fn accepts_code_and_text_extensions() {
        assert!(is_code_file("main.rs"));
        assert!(is_code_file("App.TSX"));
        assert!(is_code_file("README.md"));
        assert!(!is_code_file("logo.png"));
        assert!(!is_code_file("Makefile"));
        assert!(!is_code_file(".rs"));
    }

    #[test]
    fn file_id_slugs_the_name() {
        assert_eq!(
            generate_file_id("my file.test.ts", at()),
            "uploaded-1736087400000-my-file-test-ts"
        );
    }

    #[test]
    fn reads_utf8_and_rejects_binary() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("a.rs");
        std::fs::write(&text, "fn a() {}\n").unwrap();
        assert_eq!(read_file_as_text(&text).unwrap(), "fn a() {}\n");

        let binary = dir.path().join("b.rs");
        std::fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_file_as_text(&binary), Err(Error::NotText { .. })));
    }

    #[test]
    fn batch_skips_unsupported_paths() {
        let dir = tempfile::tempdir().unwrap();
        let code = dir.path().join("lib.py");
        let image = dir.path().join("shot.png");
        std::fs::write(&code, "print('hi')\n").unwrap();
        std::fs::write(&image, [0x89, b'P', b'N', b'G', 0x00, 0x1a]).unwrap();

        let paths = vec![code.clone(), image.clone(), dir.path().to_path_buf()];
        let batch = process_paths(&paths, at()).unwrap();

        assert_eq!(batch.files.len(), 1);
        let file = &batch.files[0];
        assert_eq!(file.name, "lib.py");
        assert_eq!(file.language, "python");
        assert_eq!(file.id, "uploaded-1736087400000-lib-py");
        assert_eq!(file.path, code);
        assert_eq!(batch.skipped, vec![image, dir.path().to_path_buf()]);
    }

    #[test]
    fn read_failure_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("ok.rs");
        let bad = dir.path().join("bad.rs");
        std::fs::write(&good, "ok").unwrap();
        std::fs::write(&bad, [0xc3, 0x28]).unwrap();

        let err = process_paths(&[good, bad], at()).unwrap_err();
        assert!(err.to_string().contains("bad.rs"));
    }

    #[test]
    fn text_files_outside_the_code_list_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let style = dir.path().join("site.css");
        let config = dir.path().join("Makefile");
        let garbled = dir.path().join("data.bin");
        std::fs::write(&style, "body { margin: 0; }\n").unwrap();
        std::fs::write(&config, "all:\n\tcargo build\n").unwrap();
        std::fs::write(&garbled, [0xc3, 0x28]).unwrap();

        let paths = vec![style, config, garbled.clone()];
        let batch = process_paths(&paths, at()).unwrap();

        let names: Vec<&str> = batch.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["site.css", "Makefile"]);
        assert_eq!(batch.files[0].language, "plaintext");
        assert_eq!(batch.skipped, vec![garbled]);
    }
}
