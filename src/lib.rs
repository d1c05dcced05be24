//! Forward-only line cursor with lookahead, position tracking, jumps and line
//! filtering, over in-memory lines or (optionally gzipped) files.
//!
//! ```
//! use linecursor::{is_data, LineCursor};
//!
//! let lines = vec!["Hello", "", "# comment", "World", "How", "are", "you?"];
//! let mut cursor = LineCursor::new(lines).with_filter(is_data);
//!
//! assert_eq!(cursor.advance()?, "Hello");
//! assert_eq!(cursor.peek()?, ""); // peek does not filter
//! assert_eq!(cursor.advance()?, "World");
//! assert_eq!(cursor.position(), 4);
//! assert_eq!(cursor.jump(3)?, "you?"); // neither does jump
//! assert!(cursor.is_empty()?);
//! assert_eq!(cursor.peek_or("default")?, "default");
//! # Ok::<(), linecursor::Error>(())
//! ```

pub use error::Error;
pub use filter::{is_data, LineFilter};
pub use line_cursor::{LineCursor, Lines};
pub use raw_line::RawLine;
pub use scoped_source::{Compression, FileLines, ScopedLineSource};

mod error;
mod filter;
mod line_cursor;
mod raw_line;
mod scoped_source;
