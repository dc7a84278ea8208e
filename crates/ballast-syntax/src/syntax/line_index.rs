// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Byte offset to line/column conversion for reporting.

/// Zero-based line and column; the column counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    /// Line number
    pub line: usize,
    /// Column number
    pub col: usize,
}

/// Precomputed line starts of one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Indexes `source`.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Position of `offset` within `source`, which must be the indexed text.
    pub fn line_col(&self, source: &str, offset: usize) -> LineCol {
        let offset = offset.min(source.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let col = source.get(start..offset).map_or(0, |text| text.chars().count());
        LineCol { line, col }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "ab\ncdé\nf";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 0), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(source, 4), LineCol { line: 1, col: 1 });
        assert_eq!(index.line_col(source, source.len()), LineCol { line: 2, col: 1 });
    }
}
