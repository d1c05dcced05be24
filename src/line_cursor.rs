use std::fmt::{Debug, Formatter};

use log::trace;

use crate::filter::LineFilter;
use crate::raw_line::RawLine;
use crate::Error;

/// Forward-only cursor over a source of text lines.
///
/// Every line handed out is stripped of surrounding whitespace. On top of plain
/// iteration the cursor keeps track of the current line and of how many lines
/// have been consumed, can peek one line ahead, jump forward, and skip lines
/// that a persistent or one-shot filter rejects.
///
/// Only [`advance`](LineCursor::advance) (and therefore iteration through
/// [`lines`](LineCursor::lines)) applies filters. [`peek`](LineCursor::peek) and [`jump`](LineCursor::jump) always
/// see the literal next lines.
pub struct LineCursor<I> {
    source: I,
    // Number of lines consumed from the source, including lines skipped by a
    // filter or by jump(). Equal to the 1-based line number of current_line.
    position: usize,
    current_line: Option<String>,
    lookahead: Option<String>,
    filter: Option<LineFilter>,
    transient_filter: Option<LineFilter>,
}

impl<I> LineCursor<I>
where
    I: Iterator,
    I::Item: RawLine,
{
    pub fn new<S>(source: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        LineCursor {
            source: source.into_iter(),
            position: 0,
            current_line: None,
            lookahead: None,
            filter: None,
            transient_filter: None,
        }
    }

    /// Start counting from `position` instead of 0, for sources that are entered
    /// in the middle. No lines are skipped.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: FnMut(&str) -> bool + 'static,
    {
        self.set_filter(filter);
        self
    }

    pub fn set_filter<F>(&mut self, filter: F)
    where
        F: FnMut(&str) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    /// Set a filter that takes the place of the persistent one for the next line
    /// pulled by [`advance`](LineCursor::advance), after which it is dropped.
    /// Calling this again before advancing replaces the pending filter.
    pub fn filter_next<F>(&mut self, filter: F)
    where
        F: FnMut(&str) -> bool + 'static,
    {
        self.transient_filter = Some(Box::new(filter));
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Zero-based index of the current line within the source, or `None` before
    /// the first line has been read.
    pub fn index(&self) -> Option<usize> {
        self.current_line.as_ref().and(self.position.checked_sub(1))
    }

    pub fn current_line(&self) -> Option<&str> {
        self.current_line.as_deref()
    }

    /// Move to the next line accepted by the filters and return it.
    ///
    /// Rejected lines are consumed and counted. On failure the position, the
    /// current line and a peeked line are left as they were.
    pub fn advance(&mut self) -> Result<&str, Error> {
        let line = self.take_accepted()?;
        Ok(self.current_line.insert(line).as_str())
    }

    /// Iterate by repeated [`advance`](LineCursor::advance). Iteration ends when
    /// the source is exhausted; other errors are yielded.
    pub fn lines(&mut self) -> Lines<'_, I> {
        Lines { cursor: self }
    }

    /// Return the next line without consuming it. Filters are not applied.
    pub fn peek(&mut self) -> Result<&str, Error> {
        let position = self.position;
        self.fill_lookahead()?.ok_or(Error::Exhausted { position })
    }

    /// Like [`peek`](LineCursor::peek), but returns `default` once the source is
    /// exhausted.
    pub fn peek_or<'a>(&'a mut self, default: &'a str) -> Result<&'a str, Error> {
        Ok(self.fill_lookahead()?.unwrap_or(default))
    }

    /// Consume `n` lines without filtering and return the last of them. A peeked
    /// line counts as the first of the `n`.
    ///
    /// `jump(0)` returns the current line. If nothing has been read yet it peeks
    /// instead, so it never consumes anything.
    pub fn jump(&mut self, n: usize) -> Result<&str, Error> {
        if n == 0 {
            return match self.current_line {
                Some(ref line) => Ok(line.as_str()),
                None => self.peek(),
            };
        }

        let buffered = self.lookahead.clone();
        match self.skip_unfiltered(n) {
            Ok(line) => {
                self.position += n;
                Ok(self.current_line.insert(line).as_str())
            }
            Err(err) => {
                self.lookahead = buffered;
                Err(err)
            }
        }
    }

    /// True if there is no further line, filtered or not. Never consumes.
    pub fn is_empty(&mut self) -> Result<bool, Error> {
        Ok(self.fill_lookahead()?.is_none())
    }

    /// Advance until `pred` accepts the current line and return it. Lines are
    /// still subject to the cursor's own filters.
    pub fn next_matching<P>(&mut self, mut pred: P) -> Result<&str, Error>
    where
        P: FnMut(&str) -> bool,
    {
        loop {
            let line = self.take_accepted()?;
            if pred(line.as_str()) {
                return Ok(self.current_line.insert(line).as_str());
            }
            self.current_line = Some(line);
        }
    }

    pub fn next_matching_or<'a, P>(
        &'a mut self,
        pred: P,
        default: &'a str,
    ) -> Result<&'a str, Error>
    where
        P: FnMut(&str) -> bool,
    {
        match self.next_matching(pred) {
            Ok(line) => Ok(line),
            Err(err) if err.is_exhausted() => Ok(default),
            Err(err) => Err(err),
        }
    }

    // Commits the new position on success. On failure a peeked line is put back.
    fn take_accepted(&mut self) -> Result<String, Error> {
        let buffered = self.lookahead.clone();
        match self.next_accepted() {
            Ok((position, line)) => {
                self.position = position;
                Ok(line)
            }
            Err(err) => {
                self.lookahead = buffered;
                Err(err)
            }
        }
    }

    fn next_accepted(&mut self) -> Result<(usize, String), Error> {
        let mut position = self.position;
        loop {
            let line = self.next_unfiltered()?.ok_or_else(|| self.exhausted())?;
            position += 1;
            if self.accepts(&line) {
                return Ok((position, line));
            }
        }
    }

    fn skip_unfiltered(&mut self, n: usize) -> Result<String, Error> {
        for _ in 1..n {
            self.next_unfiltered()?.ok_or_else(|| self.exhausted())?;
        }
        self.next_unfiltered()?.ok_or_else(|| self.exhausted())
    }

    // The one-shot filter is dropped as soon as it has judged a line, whatever
    // its verdict.
    fn accepts(&mut self, line: &str) -> bool {
        match self.transient_filter.take() {
            Some(mut filter) => filter(line),
            None => self.filter.as_mut().map_or(true, |filter| filter(line)),
        }
    }

    fn fill_lookahead(&mut self) -> Result<Option<&str>, Error> {
        if self.lookahead.is_none() {
            self.lookahead = self.pull()?;
        }
        Ok(self.lookahead.as_deref())
    }

    fn next_unfiltered(&mut self) -> Result<Option<String>, Error> {
        match self.lookahead.take() {
            Some(line) => Ok(Some(line)),
            None => self.pull(),
        }
    }

    fn pull(&mut self) -> Result<Option<String>, Error> {
        match self.source.next() {
            Some(raw) => Ok(Some(raw.into_raw_line()?.trim().to_owned())),
            None => Ok(None),
        }
    }

    fn exhausted(&self) -> Error {
        trace!("line source exhausted at position {}", self.position);
        Error::Exhausted {
            position: self.position,
        }
    }
}

/// Iterator over the accepted lines of a [`LineCursor`], see
/// [`LineCursor::lines`].
pub struct Lines<'a, I> {
    cursor: &'a mut LineCursor<I>,
}

impl<I> Iterator for Lines<'_, I>
where
    I: Iterator,
    I::Item: RawLine,
{
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor.advance() {
            Ok(line) => Some(Ok(line.to_owned())),
            Err(Error::Exhausted { .. }) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl<'a, I> IntoIterator for &'a mut LineCursor<I>
where
    I: Iterator,
    I::Item: RawLine,
{
    type Item = Result<String, Error>;
    type IntoIter = Lines<'a, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines()
    }
}

impl<I> Debug for LineCursor<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineCursor")
            .field("position", &self.position)
            .field("current_line", &self.current_line)
            .field("lookahead", &self.lookahead)
            .field("filtered", &self.filter.is_some())
            .field("filter_next_pending", &self.transient_filter.is_some())
            .finish()
    }
}
