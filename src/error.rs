use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The line source has no more lines. `position` is the cursor position at
    /// the time of the failed call, which is left unchanged.
    #[error("line source exhausted at position {position}")]
    Exhausted { position: usize },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading {} at line={position}", path.display())]
    AtLine {
        path: PathBuf,
        position: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn is_exhausted(&self) -> bool {
        match self {
            Error::Exhausted { .. } => true,
            Error::AtLine { source, .. } => source.is_exhausted(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_is_seen_through_line_context() {
        let err = Error::AtLine {
            path: PathBuf::from("data.txt"),
            position: 3,
            source: Box::new(Error::Exhausted { position: 3 }),
        };
        assert!(err.is_exhausted());
        assert_eq!(err.to_string(), "error reading data.txt at line=3");

        let err = Error::from(io::Error::new(io::ErrorKind::InvalidData, "bad utf-8"));
        assert!(!err.is_exhausted());
        assert_eq!(err.to_string(), "bad utf-8");
    }
}
