//! Table cell matrices and their structural mutations.
//!
//! A [`Grid`] is a `rows × cols` matrix of [`TableCell`]s. A cell may hold a
//! nested grid, so tables nest to any depth; every operation here applies to a
//! single level and nested grids are reached through a [`CellPos`] path.
//!
//! Two invariants hold after every operation:
//! - `cells.len() == rows` and every row has exactly `cols` entries;
//! - a cell with `row_span > 1` or `col_span > 1` anchors a rectangle in which
//!   every other cell is `merged` and empty.

use serde::{Deserialize, Serialize};

/// Position of a cell inside one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Exclusive content of a cell. Setting one kind clears the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CellContent {
    Text(String),
    Image(String),
    Gif(String),
    Video(String),
    Audio {
        url: String,
        transcript: Option<String>,
    },
}

fn one() -> usize {
    1
}

fn is_one(value: &usize) -> bool {
    *value == 1
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One cell of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gif: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Transcript of `audio`; only kept while the cell holds audio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_table: Option<Box<Grid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_height: Option<f64>,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub row_span: usize,
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub col_span: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub merged: bool,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            text: String::new(),
            image: None,
            gif: None,
            video: None,
            audio: None,
            transcript: None,
            nested_table: None,
            custom_width: None,
            custom_height: None,
            row_span: 1,
            col_span: 1,
            merged: false,
        }
    }
}

impl TableCell {
    /// A covered cell inside a merged span.
    fn covered() -> Self {
        Self {
            merged: true,
            ..Self::default()
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Whether this cell anchors a span larger than itself.
    pub fn is_anchor(&self) -> bool {
        !self.merged && (self.row_span > 1 || self.col_span > 1)
    }

    /// Replace the cell's content, clearing every other content kind.
    pub fn set_content(&mut self, content: CellContent) {
        self.text.clear();
        self.image = None;
        self.gif = None;
        self.video = None;
        self.audio = None;
        self.transcript = None;
        match content {
            CellContent::Text(text) => self.text = text,
            CellContent::Image(url) => self.image = Some(url),
            CellContent::Gif(url) => self.gif = Some(url),
            CellContent::Video(url) => self.video = Some(url),
            CellContent::Audio { url, transcript } => {
                self.audio = Some(url);
                self.transcript = transcript;
            }
        }
    }

    /// The cell's current content, if any.
    pub fn content(&self) -> Option<CellContent> {
        if let Some(url) = &self.audio {
            return Some(CellContent::Audio {
                url: url.clone(),
                transcript: self.transcript.clone(),
            });
        }
        if let Some(url) = &self.image {
            return Some(CellContent::Image(url.clone()));
        }
        if let Some(url) = &self.gif {
            return Some(CellContent::Gif(url.clone()));
        }
        if let Some(url) = &self.video {
            return Some(CellContent::Video(url.clone()));
        }
        (!self.text.is_empty()).then(|| CellContent::Text(self.text.clone()))
    }

    /// Feed transcription output into the cell.
    ///
    /// A cell holding audio receives the text as the audio's transcript;
    /// any other cell receives it as its text.
    pub fn apply_transcript(&mut self, text: &str) {
        if self.audio.is_some() {
            self.transcript = Some(text.to_string());
        } else {
            self.set_content(CellContent::Text(text.to_string()));
        }
    }
}

/// A `rows × cols` matrix of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<TableCell>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Grid {
    /// Create an empty grid. Zero dimensions are raised to 1.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            cells: (0..rows).map(|_| vec![TableCell::default(); cols]).collect(),
        }
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn cell(&self, pos: CellPos) -> Option<&TableCell> {
        self.cells.get(pos.row)?.get(pos.col)
    }

    pub fn cell_mut(&mut self, pos: CellPos) -> Option<&mut TableCell> {
        self.cells.get_mut(pos.row)?.get_mut(pos.col)
    }

    /// Follow a path of cells through nested grids. An empty path is `self`.
    pub fn grid_at(&self, path: &[CellPos]) -> Option<&Grid> {
        let mut grid = self;
        for &pos in path {
            grid = grid.cell(pos)?.nested_table.as_deref()?;
        }
        Some(grid)
    }

    pub fn grid_at_mut(&mut self, path: &[CellPos]) -> Option<&mut Grid> {
        let mut grid = self;
        for &pos in path {
            grid = grid.cell_mut(pos)?.nested_table.as_deref_mut()?;
        }
        Some(grid)
    }

    /// Cells with a span larger than one, with their spans.
    fn anchors(&self) -> Vec<(CellPos, usize, usize)> {
        let mut anchors = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if cell.is_anchor() {
                    anchors.push((CellPos::new(r, c), cell.row_span, cell.col_span));
                }
            }
        }
        anchors
    }

    /// Append an empty row.
    pub fn add_row(&mut self) {
        self.cells.push(vec![TableCell::default(); self.cols]);
        self.rows += 1;
    }

    /// Append an empty column.
    pub fn add_column(&mut self) {
        for row in &mut self.cells {
            row.push(TableCell::default());
        }
        self.cols += 1;
    }

    /// Remove the row at `index`. Refused for the last remaining row.
    ///
    /// Spans crossing the row shrink by one; a span anchored on the row moves
    /// its anchor to the row below.
    pub fn delete_row(&mut self, index: usize) -> bool {
        if self.rows <= 1 || index >= self.rows {
            return false;
        }

        for (pos, row_span, _) in self.anchors() {
            if pos.row > index || pos.row + row_span <= index {
                continue;
            }
            if pos.row < index {
                self.cells[pos.row][pos.col].row_span -= 1;
            } else if row_span > 1 {
                let mut anchor = std::mem::take(&mut self.cells[pos.row][pos.col]);
                anchor.row_span -= 1;
                self.cells[pos.row + 1][pos.col] = anchor;
            }
        }

        self.cells.remove(index);
        self.rows -= 1;
        log::debug!("Deleted row {index}, grid is now {}x{}", self.rows, self.cols);
        true
    }

    /// Remove the column at `index`. Refused for the last remaining column.
    pub fn delete_column(&mut self, index: usize) -> bool {
        if self.cols <= 1 || index >= self.cols {
            return false;
        }

        for (pos, _, col_span) in self.anchors() {
            if pos.col > index || pos.col + col_span <= index {
                continue;
            }
            if pos.col < index {
                self.cells[pos.row][pos.col].col_span -= 1;
            } else if col_span > 1 {
                let mut anchor = std::mem::take(&mut self.cells[pos.row][pos.col]);
                anchor.col_span -= 1;
                self.cells[pos.row][pos.col + 1] = anchor;
            }
        }

        for row in &mut self.cells {
            row.remove(index);
        }
        self.cols -= 1;
        log::debug!("Deleted column {index}, grid is now {}x{}", self.rows, self.cols);
        true
    }

    /// Merge the bounding rectangle of `cells` into one span.
    ///
    /// Needs at least two distinct cells inside the grid. The rectangle grows
    /// to swallow any existing span it overlaps. The top-left cell becomes the
    /// anchor and receives the non-empty texts of the merged cells joined by
    /// spaces; every other cell is marked merged and emptied.
    /// Returns the anchor position.
    pub fn merge(&mut self, cells: &[CellPos]) -> Option<CellPos> {
        let mut selected: Vec<CellPos> = cells.iter().copied().filter(|p| self.contains(*p)).collect();
        selected.sort_unstable();
        selected.dedup();
        if selected.len() < 2 {
            return None;
        }

        let mut min_row = selected.iter().map(|p| p.row).min()?;
        let mut max_row = selected.iter().map(|p| p.row).max()?;
        let mut min_col = selected.iter().map(|p| p.col).min()?;
        let mut max_col = selected.iter().map(|p| p.col).max()?;

        // Grow until no existing span straddles the rectangle's edge
        let anchors = self.anchors();
        loop {
            let mut grown = false;
            for &(pos, row_span, col_span) in &anchors {
                let (r0, r1) = (pos.row, pos.row + row_span - 1);
                let (c0, c1) = (pos.col, pos.col + col_span - 1);
                let overlaps = r0 <= max_row && r1 >= min_row && c0 <= max_col && c1 >= min_col;
                let inside = r0 >= min_row && r1 <= max_row && c0 >= min_col && c1 <= max_col;
                if overlaps && !inside {
                    min_row = min_row.min(r0);
                    max_row = max_row.max(r1);
                    min_col = min_col.min(c0);
                    max_col = max_col.max(c1);
                    grown = true;
                }
            }
            if !grown {
                break;
            }
        }

        let mut texts = Vec::new();
        for r in min_row..=max_row {
            for c in min_col..=max_col {
                let cell = &self.cells[r][c];
                if !cell.merged && !cell.text.trim().is_empty() {
                    texts.push(cell.text.clone());
                }
            }
        }
        let joined = texts.join(" ");

        for r in min_row..=max_row {
            for c in min_col..=max_col {
                if (r, c) != (min_row, min_col) {
                    self.cells[r][c] = TableCell::covered();
                }
            }
        }

        let anchor = &mut self.cells[min_row][min_col];
        anchor.row_span = max_row - min_row + 1;
        anchor.col_span = max_col - min_col + 1;
        if !joined.is_empty() {
            anchor.set_content(CellContent::Text(joined));
        }

        log::debug!(
            "Merged rows {min_row}..={max_row}, cols {min_col}..={max_col}"
        );
        Some(CellPos::new(min_row, min_col))
    }

    /// Split a merged span back into individual cells.
    ///
    /// Only an anchor can be split. Covered cells come back empty; the merged
    /// texts stay on the anchor.
    pub fn split(&mut self, pos: CellPos) -> bool {
        let Some(cell) = self.cell(pos) else {
            return false;
        };
        if !cell.is_anchor() {
            return false;
        }
        let (row_span, col_span) = (cell.row_span, cell.col_span);
        let row_end = (pos.row + row_span).min(self.rows);
        let col_end = (pos.col + col_span).min(self.cols);

        for r in pos.row..row_end {
            for c in pos.col..col_end {
                if (r, c) != (pos.row, pos.col) {
                    self.cells[r][c] = TableCell::default();
                }
            }
        }
        let anchor = &mut self.cells[pos.row][pos.col];
        anchor.row_span = 1;
        anchor.col_span = 1;
        log::debug!("Split cell ({}, {})", pos.row, pos.col);
        true
    }

    /// Replace a cell's content. Refused for covered cells.
    pub fn set_content(&mut self, pos: CellPos, content: CellContent) -> bool {
        match self.cell_mut(pos) {
            Some(cell) if !cell.merged => {
                cell.set_content(content);
                true
            }
            _ => false,
        }
    }

    /// Set or clear a cell's custom size.
    pub fn set_cell_size(&mut self, pos: CellPos, width: Option<f64>, height: Option<f64>) -> bool {
        match self.cell_mut(pos) {
            Some(cell) if !cell.merged => {
                cell.custom_width = width.map(|w| w.max(0.0));
                cell.custom_height = height.map(|h| h.max(0.0));
                true
            }
            _ => false,
        }
    }

    /// Place a new empty grid inside a cell, replacing any existing one.
    pub fn insert_nested(&mut self, pos: CellPos, rows: usize, cols: usize) -> bool {
        match self.cell_mut(pos) {
            Some(cell) if !cell.merged => {
                cell.nested_table = Some(Box::new(Grid::new(rows, cols)));
                true
            }
            _ => false,
        }
    }

    /// Remove the nested grid from a cell.
    pub fn remove_nested(&mut self, pos: CellPos) -> bool {
        self.cell_mut(pos)
            .and_then(|cell| cell.nested_table.take())
            .is_some()
    }

    /// Whether this level has `rows` rows of exactly `cols` cells.
    pub fn is_rectangular(&self) -> bool {
        self.rows >= 1
            && self.cols >= 1
            && self.cells.len() == self.rows
            && self.cells.iter().all(|row| row.len() == self.cols)
    }

    /// Check the span invariant on this level.
    fn spans_consistent(&self) -> bool {
        let mut covered = vec![vec![false; self.cols]; self.rows];
        for (pos, row_span, col_span) in self.anchors() {
            if pos.row + row_span > self.rows || pos.col + col_span > self.cols {
                return false;
            }
            for r in pos.row..pos.row + row_span {
                for c in pos.col..pos.col + col_span {
                    if (r, c) == (pos.row, pos.col) {
                        continue;
                    }
                    let cell = &self.cells[r][c];
                    if covered[r][c] || !cell.merged || cell.content().is_some() {
                        return false;
                    }
                    covered[r][c] = true;
                }
            }
        }
        self.cells
            .iter()
            .enumerate()
            .all(|(r, row)| row.iter().enumerate().all(|(c, cell)| cell.merged == covered[r][c]))
    }

    /// Check both invariants on this grid and every nested grid.
    pub fn check_invariants(&self) -> bool {
        let mut stack = vec![self];
        while let Some(grid) = stack.pop() {
            if !grid.is_rectangular() || !grid.spans_consistent() {
                return false;
            }
            for cell in grid.cells.iter().flatten() {
                if let Some(nested) = cell.nested_table.as_deref() {
                    stack.push(nested);
                }
            }
        }
        true
    }

    /// Repair a grid read from outside: pad or truncate to `rows × cols`, then
    /// clip spans to the grid and re-derive `merged` flags from the anchors.
    /// Applies to every nested grid as well. Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut repaired = false;
        let mut stack = vec![self];
        while let Some(grid) = stack.pop() {
            repaired |= grid.normalize_level();
            for cell in grid.cells.iter_mut().flatten() {
                if let Some(nested) = cell.nested_table.as_deref_mut() {
                    stack.push(nested);
                }
            }
        }
        repaired
    }

    fn normalize_level(&mut self) -> bool {
        let before = self.clone();

        self.rows = self.rows.max(1);
        self.cols = self.cols.max(1);
        self.cells.resize_with(self.rows, Vec::new);
        for row in &mut self.cells {
            row.resize_with(self.cols, TableCell::default);
        }

        let mut covered = vec![vec![false; self.cols]; self.rows];
        for r in 0..self.rows {
            for c in 0..self.cols {
                let cell = &mut self.cells[r][c];
                if covered[r][c] {
                    *cell = TableCell::covered();
                    continue;
                }
                cell.merged = false;
                cell.row_span = cell.row_span.clamp(1, self.rows - r);
                cell.col_span = cell.col_span.clamp(1, self.cols - c);
                let overlaps_span = (r..r + cell.row_span)
                    .any(|rr| (c..c + cell.col_span).any(|cc| covered[rr][cc]));
                if overlaps_span {
                    cell.row_span = 1;
                    cell.col_span = 1;
                }
                let (row_span, col_span) = (cell.row_span, cell.col_span);
                for rr in r..r + row_span {
                    for cc in c..c + col_span {
                        if (rr, cc) != (r, c) {
                            covered[rr][cc] = true;
                        }
                    }
                }
            }
        }

        let changed = *self != before;
        if changed {
            log::warn!("Repaired malformed table grid ({}x{})", self.rows, self.cols);
        }
        changed
    }
}
