/// Predicate over a stripped line. Lines for which it returns false are skipped
/// by [`LineCursor::advance`](crate::LineCursor::advance).
pub type LineFilter = Box<dyn FnMut(&str) -> bool>;

/// True for lines that carry data: non-empty and not a `#` comment. Expects an
/// already stripped line.
pub fn is_data(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}
