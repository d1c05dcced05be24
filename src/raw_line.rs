use std::borrow::Cow;
use std::io;

/// An item produced by a line source, convertible into one raw (unstripped) line.
///
/// Sources backed by I/O yield `io::Result<String>` (e.g. `BufRead::lines`); any
/// error is handed back to the cursor unchanged.
pub trait RawLine {
    fn into_raw_line(self) -> io::Result<String>;
}

impl RawLine for String {
    fn into_raw_line(self) -> io::Result<String> {
        Ok(self)
    }
}

impl RawLine for &str {
    fn into_raw_line(self) -> io::Result<String> {
        Ok(self.to_owned())
    }
}

impl RawLine for Cow<'_, str> {
    fn into_raw_line(self) -> io::Result<String> {
        Ok(self.into_owned())
    }
}

impl<T: RawLine> RawLine for io::Result<T> {
    fn into_raw_line(self) -> io::Result<String> {
        self?.into_raw_line()
    }
}
