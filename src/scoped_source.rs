use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::{debug, warn};

use crate::filter::LineFilter;
use crate::{Error, LineCursor};

/// Lines of an opened file, after gzip decoding if any.
pub type FileLines = io::Lines<Box<dyn BufRead>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// Gzip iff the file name ends in `.gz`.
    #[default]
    Auto,
    Gzip,
    Plain,
}

impl Compression {
    fn is_gzip(self, path: &Path) -> bool {
        match self {
            Compression::Auto => path.extension().is_some_and(|ext| ext == "gz"),
            Compression::Gzip => true,
            Compression::Plain => false,
        }
    }
}

/// Opens a file and hands out a [`LineCursor`] over its lines.
///
/// The file stays open for as long as the cursor lives. [`scope`](Self::scope)
/// bounds that to a closure and tags any failure with the file name and the
/// position reached.
pub struct ScopedLineSource {
    path: PathBuf,
    position: usize,
    filter: Option<LineFilter>,
    compression: Compression,
}

impl ScopedLineSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScopedLineSource {
            path: path.into(),
            position: 0,
            filter: None,
            compression: Compression::default(),
        }
    }

    pub fn position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: FnMut(&str) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file. It is closed when the returned cursor is dropped.
    pub fn open(self) -> Result<LineCursor<FileLines>, Error> {
        let file = File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source,
        })?;

        let gzip = self.compression.is_gzip(&self.path);
        debug!("opened {} (gzip: {})", self.path.display(), gzip);
        let reader: Box<dyn BufRead> = if gzip {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let mut cursor = LineCursor::new(reader.lines()).with_position(self.position);
        if let Some(filter) = self.filter {
            cursor.set_filter(filter);
        }
        Ok(cursor)
    }

    /// Open the file, run `f` over its cursor and close the file again, whether
    /// `f` succeeds or not.
    ///
    /// An error from `f` comes back as [`Error::AtLine`] carrying the path and
    /// the cursor position at the time of failure.
    pub fn scope<T, F>(self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut LineCursor<FileLines>) -> Result<T, Error>,
    {
        let path = self.path.clone();
        let mut cursor = self.open()?;
        f(&mut cursor).map_err(|err| {
            let position = cursor.position();
            warn!("error reading {} at line={}: {}", path.display(), position, err);
            Error::AtLine {
                path,
                position,
                source: Box::new(err),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::is_data;

    const CONTENTS: &str = "Hello\n# comment\n\nWorld";

    fn plain_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn gzip_file(contents: &str) -> NamedTempFile {
        let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), flate2::Compression::default());
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap();
        file
    }

    fn read_all(source: ScopedLineSource) -> Vec<(String, usize)> {
        source
            .scope(|cursor| {
                let mut lines = Vec::new();
                while let Some(line) = cursor.lines().next() {
                    lines.push((line?, cursor.position()));
                }
                Ok(lines)
            })
            .unwrap()
    }

    #[test]
    fn plain_file_with_filter() {
        let file = plain_file(CONTENTS);
        let lines = read_all(ScopedLineSource::new(file.path()).filter(is_data));
        assert_eq!(
            lines,
            vec![("Hello".to_string(), 1), ("World".to_string(), 4)]
        );
    }

    #[test]
    fn gzip_file_detected_by_extension() {
        let file = gzip_file(CONTENTS);
        let lines = read_all(ScopedLineSource::new(file.path()).filter(is_data));
        assert_eq!(
            lines,
            vec![("Hello".to_string(), 1), ("World".to_string(), 4)]
        );
    }

    #[test]
    fn explicit_compression_overrides_extension() {
        let file = gzip_file("a\nb\n");
        let mut cursor = ScopedLineSource::new(file.path())
            .compression(Compression::Plain)
            .open()
            .unwrap();
        // Raw gzip bytes are not valid UTF-8.
        assert!(matches!(cursor.advance(), Err(Error::Io(_))));

        let plain = plain_file("a\nb\n");
        let mut cursor = ScopedLineSource::new(plain.path())
            .compression(Compression::Plain)
            .open()
            .unwrap();
        assert_eq!(cursor.advance().unwrap(), "a");
    }

    #[test]
    fn compression_auto_detection() {
        assert!(Compression::Auto.is_gzip(Path::new("lines.txt.gz")));
        assert!(!Compression::Auto.is_gzip(Path::new("lines.txt")));
        assert!(!Compression::Auto.is_gzip(Path::new("gz")));
        assert!(Compression::Gzip.is_gzip(Path::new("lines.txt")));
        assert!(!Compression::Plain.is_gzip(Path::new("lines.gz")));
    }

    #[test]
    fn starting_position() {
        let file = plain_file("x\ny\n");
        let source = ScopedLineSource::new(file.path()).position(10);
        assert_eq!(source.path(), file.path());
        let mut cursor = source.open().unwrap();
        assert_eq!(cursor.advance().unwrap(), "x");
        assert_eq!(cursor.position(), 11);
    }

    #[test]
    fn failure_is_tagged_with_path_and_position() {
        let file = plain_file(CONTENTS);
        let err = ScopedLineSource::new(file.path())
            .filter(is_data)
            .scope(|cursor| {
                cursor.jump(2)?;
                cursor.jump(5)?;
                Ok(())
            })
            .unwrap_err();

        match &err {
            Error::AtLine {
                path,
                position,
                source,
            } => {
                assert_eq!(path, file.path());
                assert_eq!(*position, 2);
                assert!(source.is_exhausted());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err
            .to_string()
            .ends_with(&format!("{} at line=2", file.path().display())));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = ScopedLineSource::new(&path).open().unwrap_err();
        assert!(matches!(err, Error::Open { source, .. } if source.kind() == io::ErrorKind::NotFound));
    }
}
