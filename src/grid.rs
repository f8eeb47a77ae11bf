// 🧮 Styled Grid - (value, style tag) cells, no spreadsheet library types
// Rows and columns are 1-based, like the sheet they end up in

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text as shown with the `#,##0;(#,##0)` format
    pub fn display(&self) -> String {
        match self {
            CellValue::Blank => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_thousands(*n),
        }
    }
}

/// What a cell is, independent of how it gets painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Title,
    Units,
    Header,
    Banner,
    Label,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Fill {
    None,
    Banner,
    Band,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StyleTag {
    pub role: Role,
    pub fill: Fill,
    /// Thousands format with parenthesized negatives, right-aligned
    pub numeric: bool,
}

impl StyleTag {
    pub fn new(role: Role) -> Self {
        StyleTag {
            role,
            fill: Fill::None,
            numeric: false,
        }
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: StyleTag,
}

/// Sparse grid. Unset positions are blank and unstyled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: BTreeMap<(u32, u16), Cell>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: u32, col: u16, value: CellValue, style: StyleTag) {
        debug_assert!(row >= 1 && col >= 1, "grid is 1-based");
        self.cells.insert((row, col), Cell { value, style });
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut Cell> {
        self.cells.get_mut(&(row, col))
    }

    /// Last populated row, 0 when empty
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|&(r, _)| r).max().unwrap_or(0)
    }

    /// Last populated column, 0 when empty
    pub fn max_column(&self) -> u16 {
        self.cells.keys().map(|&(_, c)| c).max().unwrap_or(0)
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.cells.iter().map(|(&(r, c), cell)| (r, c, cell))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (u32, u16, &mut Cell)> {
        self.cells.iter_mut().map(|(&(r, c), cell)| (r, c, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

fn format_thousands(n: f64) -> String {
    let rounded = n.abs().round();
    let digits = format!("{:.0}", rounded);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if n < 0.0 && rounded != 0.0 {
        format!("({})", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(CellValue::Number(1234567.4).display(), "1,234,567");
        assert_eq!(CellValue::Number(-2500.0).display(), "(2,500)");
        assert_eq!(CellValue::Number(999.5).display(), "1,000");
        assert_eq!(CellValue::Number(-0.2).display(), "0");
        assert_eq!(CellValue::Blank.display(), "");
    }

    #[test]
    fn test_bounds_track_populated_cells() {
        let mut grid = Grid::new();
        assert_eq!((grid.max_row(), grid.max_column()), (0, 0));

        grid.set(2, 1, CellValue::Text("Line Item".into()), StyleTag::new(Role::Header));
        grid.set(5, 4, CellValue::Number(1.0), StyleTag::new(Role::Value));
        assert_eq!((grid.max_row(), grid.max_column()), (5, 4));
    }

    #[test]
    fn test_cells_row_major() {
        let mut grid = Grid::new();
        grid.set(3, 1, CellValue::Blank, StyleTag::new(Role::Banner));
        grid.set(2, 2, CellValue::Blank, StyleTag::new(Role::Header));
        grid.set(2, 1, CellValue::Blank, StyleTag::new(Role::Header));

        let order: Vec<(u32, u16)> = grid.cells().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(order, vec![(2, 1), (2, 2), (3, 1)]);
    }
}
