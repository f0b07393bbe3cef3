//! Byte ranges into source text.

use std::ops::Range;

/// A half-open byte range `start..end` into a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    /// Returns the span of the line containing byte `offset`, without its line break.
    ///
    /// Offsets past the end of `source` are clamped to its length.
    pub fn line_at(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset);
        let start = source[..offset].rfind('\n').map_or(0, |idx| idx + 1);
        let end = source[offset..]
            .find('\n')
            .map_or(source.len(), |idx| offset + idx);
        let end = if source[start..end].ends_with('\r') {
            end - 1
        } else {
            end
        };
        Self::new(start..end)
    }

    /// Returns the byte offset of a 1-based `line` and `column` position.
    pub fn offset_of(source: &str, line: usize, column: usize) -> usize {
        let line_start: usize = source
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        floor_char_boundary(source, line_start + column.saturating_sub(1))
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
