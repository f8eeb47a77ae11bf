// 🖨️ Sheet Renderer - sections -> styled grid
//
// Layout walks row positions top to bottom and never goes back:
//   row 1   reserved for the title
//   row 2   header: "Line Item" + one column per period
//   row 3+  per section: banner row, one row per line item, blank separator
// Post-processing then fills the title row, freezes panes, sizes columns and
// marks numeric cells for the thousands format.

use crate::grid::{CellValue, Fill, Grid, Role, StyleTag};
use crate::sections::OrderedSections;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TITLE_ROW: u32 = 1;
pub const HEADER_ROW: u32 = 2;
pub const FIRST_SECTION_ROW: u32 = 3;
pub const LABEL_COLUMN: u16 = 1;
pub const FIRST_PERIOD_COLUMN: u16 = 2;

pub const LABEL_COLUMN_WIDTH: f64 = 42.0;
pub const PERIOD_COLUMN_WIDTH: f64 = 16.0;
pub const NUMBER_FORMAT: &str = "#,##0;(#,##0)";
pub const HEADER_LABEL: &str = "Line Item";

/// Rows above / columns left of the split stay visible while scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreezePanes {
    pub rows: u32,
    pub columns: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetLayout {
    pub freeze: Option<FreezePanes>,
    /// 1-based column -> width in character units
    pub column_widths: BTreeMap<u16, f64>,
}

/// One statement laid out and styled, ready for the workbook writer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSheet {
    pub name: String,
    pub grid: Grid,
    pub layout: SheetLayout,
}

impl RenderedSheet {
    /// Row holding the banner for `section`, if rendered
    pub fn banner_row(&self, section: &str) -> Option<u32> {
        self.grid
            .cells()
            .find(|(_, c, cell)| {
                *c == LABEL_COLUMN
                    && cell.style.role == Role::Banner
                    && cell.value.as_text() == Some(section)
            })
            .map(|(r, _, _)| r)
    }
}

/// Band fill goes on even absolute rows, whatever section they belong to
pub fn is_banded(row: u32) -> bool {
    row % 2 == 0
}

struct RowCursor {
    next: u32,
}

impl RowCursor {
    fn starting_at(row: u32) -> Self {
        RowCursor { next: row }
    }

    fn advance(&mut self) -> u32 {
        let row = self.next;
        self.next += 1;
        row
    }
}

/// Lay out and style one statement.
pub fn render_sheet(
    name: &str,
    title: &str,
    units: &str,
    periods: &[String],
    sections: &OrderedSections<'_>,
) -> RenderedSheet {
    let mut sheet = RenderedSheet {
        name: name.to_string(),
        grid: lay_out(periods, sections),
        layout: SheetLayout::default(),
    };

    // Each step needs the fully populated grid
    insert_title(&mut sheet.grid, title, units);
    freeze_headers(&mut sheet.layout);
    set_column_widths(&mut sheet.layout, sheet.grid.max_column());
    apply_number_formats(&mut sheet.grid, HEADER_ROW, FIRST_PERIOD_COLUMN);

    sheet
}

fn lay_out(periods: &[String], sections: &OrderedSections<'_>) -> Grid {
    let mut grid = Grid::new();
    let last_column = FIRST_PERIOD_COLUMN + periods.len() as u16 - 1;
    let header = StyleTag::new(Role::Header);

    grid.set(HEADER_ROW, LABEL_COLUMN, CellValue::Text(HEADER_LABEL.to_string()), header);
    for (col, period) in (FIRST_PERIOD_COLUMN..).zip(periods) {
        grid.set(HEADER_ROW, col, CellValue::Text(period.clone()), header);
    }

    let mut cursor = RowCursor::starting_at(FIRST_SECTION_ROW);

    for section in sections {
        let banner_row = cursor.advance();
        let banner = StyleTag::new(Role::Banner).with_fill(Fill::Banner);
        grid.set(banner_row, LABEL_COLUMN, CellValue::Text(section.name.to_string()), banner);
        for col in FIRST_PERIOD_COLUMN..=last_column {
            grid.set(banner_row, col, CellValue::Blank, banner);
        }

        for line in section.rows.rows() {
            let row = cursor.advance();
            let fill = if is_banded(row) { Fill::Band } else { Fill::None };

            grid.set(
                row,
                LABEL_COLUMN,
                CellValue::Text(line.label.clone()),
                StyleTag::new(Role::Label).with_fill(fill),
            );

            let value_style = StyleTag::new(Role::Value).with_fill(fill);
            for (col, value) in (FIRST_PERIOD_COLUMN..).zip(&line.values) {
                match value.filter(|v| !v.is_nan()) {
                    Some(v) => grid.set(row, col, CellValue::Number(v), value_style),
                    // Banded blanks still carry the fill
                    None if fill == Fill::Band => grid.set(row, col, CellValue::Blank, value_style),
                    None => {}
                }
            }
        }

        // Blank separator row, left unstyled
        cursor.advance();
    }

    grid
}

fn insert_title(grid: &mut Grid, title: &str, units: &str) {
    // Never let the units annotation overwrite the title
    let units_column = grid.max_column().max(FIRST_PERIOD_COLUMN);

    grid.set(TITLE_ROW, LABEL_COLUMN, CellValue::Text(title.to_string()), StyleTag::new(Role::Title));
    grid.set(TITLE_ROW, units_column, CellValue::Text(units.to_string()), StyleTag::new(Role::Units));
}

fn freeze_headers(layout: &mut SheetLayout) {
    layout.freeze = Some(FreezePanes {
        rows: HEADER_ROW,
        columns: LABEL_COLUMN,
    });
}

fn set_column_widths(layout: &mut SheetLayout, last_column: u16) {
    layout.column_widths.insert(LABEL_COLUMN, LABEL_COLUMN_WIDTH);
    for col in FIRST_PERIOD_COLUMN..=last_column {
        layout.column_widths.insert(col, PERIOD_COLUMN_WIDTH);
    }
}

fn apply_number_formats(grid: &mut Grid, start_row: u32, start_col: u16) {
    for (row, col, cell) in grid.cells_mut() {
        if row >= start_row && col >= start_col && cell.value.as_number().is_some() {
            cell.style.numeric = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ClassificationRule, RuleSet};
    use crate::sections::build_sections;
    use crate::table::StatementTable;

    fn periods() -> Vec<String> {
        vec!["2021".to_string(), "2022".to_string()]
    }

    fn two_section_rules() -> RuleSet {
        RuleSet::new(
            vec![
                ClassificationRule::new("Assets", &["asset"]),
                ClassificationRule::new("Liabilities", &["liabilit"]),
            ],
            "Other",
        )
    }

    fn six_row_table() -> StatementTable {
        let mut t = StatementTable::new(periods()).unwrap();
        t.push_row("Asset A", vec![None, Some(2.0)]).unwrap();
        t.push_row("Liability A", vec![Some(-3.0), None]).unwrap();
        t.push_row("Asset B", vec![Some(9.0), Some(4.0)]).unwrap();
        t.push_row("Liability B", vec![Some(5.0), Some(6.0)]).unwrap();
        t.push_row("Asset C", vec![Some(7.0), Some(8.0)]).unwrap();
        t.push_row("Liability C", vec![None, None]).unwrap();
        t
    }

    fn render(table: &StatementTable, rules: &RuleSet) -> RenderedSheet {
        let sections = build_sections(table, rules);
        render_sheet("Balance Sheet", "V — Balance Sheet", "USD ($000s)", table.periods(), &sections)
    }

    fn text(sheet: &RenderedSheet, row: u32, col: u16) -> Option<String> {
        sheet.grid.get(row, col).and_then(|c| c.value.as_text().map(str::to_string))
    }

    #[test]
    fn test_header_row() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        assert_eq!(text(&sheet, 2, 1).as_deref(), Some("Line Item"));
        assert_eq!(text(&sheet, 2, 2).as_deref(), Some("2021"));
        assert_eq!(text(&sheet, 2, 3).as_deref(), Some("2022"));
        assert!((1..=3).all(|c| sheet.grid.get(2, c).unwrap().style.role == Role::Header));
    }

    #[test]
    fn test_section_layout_rows() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        // 3 banner, 4-6 assets, 7 blank, 8 banner, 9-11 liabilities
        assert_eq!(sheet.banner_row("Assets"), Some(3));
        assert_eq!(sheet.banner_row("Liabilities"), Some(8));
        assert_eq!(text(&sheet, 4, 1).as_deref(), Some("Asset A"));
        assert_eq!(text(&sheet, 6, 1).as_deref(), Some("Asset C"));
        assert_eq!(text(&sheet, 9, 1).as_deref(), Some("Liability A"));
        assert_eq!(text(&sheet, 11, 1).as_deref(), Some("Liability C"));
        assert!((1..=3).all(|c| sheet.grid.get(7, c).is_none()));
        assert_eq!(sheet.grid.max_row(), 11);
    }

    #[test]
    fn test_banner_spans_table_width() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        for col in 1..=3 {
            let cell = sheet.grid.get(8, col).unwrap();
            assert_eq!(cell.style.role, Role::Banner);
            assert_eq!(cell.style.fill, Fill::Banner);
        }
        assert_eq!(sheet.grid.get(8, 2).unwrap().value, CellValue::Blank);
    }

    #[test]
    fn test_banding_follows_absolute_row_parity() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        for row in [4u32, 5, 6, 9, 10, 11] {
            let fill = sheet.grid.get(row, 1).unwrap().style.fill;
            let expected = if row % 2 == 0 { Fill::Band } else { Fill::None };
            assert_eq!(fill, expected, "row {}", row);
        }

        // Banded rows are filled across the full width, even where blank
        let blank = sheet.grid.get(4, 2).map(|c| (c.value.clone(), c.style.fill));
        assert_eq!(blank, Some((CellValue::Blank, Fill::Band)));
        let row_10: Vec<Fill> = (1..=3).map(|c| sheet.grid.get(10, c).unwrap().style.fill).collect();
        assert_eq!(row_10, vec![Fill::Band; 3]);

        // Unbanded missing value stays unset
        assert!(sheet.grid.get(11, 2).is_none());
    }

    #[test]
    fn test_title_and_units() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        let title = sheet.grid.get(1, 1).unwrap();
        assert_eq!(title.value, CellValue::Text("V — Balance Sheet".into()));
        assert_eq!(title.style.role, Role::Title);

        let units = sheet.grid.get(1, 3).unwrap();
        assert_eq!(units.value, CellValue::Text("USD ($000s)".into()));
        assert_eq!(units.style.role, Role::Units);
    }

    #[test]
    fn test_units_never_overwrite_title() {
        let table = StatementTable::new(vec![]).unwrap();
        let rules = RuleSet::income();
        let sheet = render(&table, &rules);

        assert_eq!(text(&sheet, 1, 1).as_deref(), Some("V — Balance Sheet"));
        assert_eq!(text(&sheet, 1, 2).as_deref(), Some("USD ($000s)"));
    }

    #[test]
    fn test_layout_freeze_and_widths() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        assert_eq!(sheet.layout.freeze, Some(FreezePanes { rows: 2, columns: 1 }));
        assert_eq!(sheet.layout.column_widths.get(&1), Some(&42.0));
        assert_eq!(sheet.layout.column_widths.get(&2), Some(&16.0));
        assert_eq!(sheet.layout.column_widths.get(&3), Some(&16.0));
        assert_eq!(sheet.layout.column_widths.len(), 3);
    }

    #[test]
    fn test_only_numbers_get_number_format() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        for (row, col, cell) in sheet.grid.cells() {
            let expect = cell.value.as_number().is_some();
            assert_eq!(cell.style.numeric, expect, "cell ({}, {})", row, col);
            if expect {
                assert!(row > HEADER_ROW && col >= FIRST_PERIOD_COLUMN);
            }
        }
    }

    #[test]
    fn test_every_value_lands_at_its_coordinate() {
        let table = six_row_table();
        let sheet = render(&table, &two_section_rules());

        for line in table.rows() {
            let row = sheet
                .grid
                .cells()
                .find(|(_, c, cell)| *c == 1 && cell.value.as_text() == Some(line.label.as_str()))
                .map(|(r, _, _)| r)
                .unwrap();

            for (i, expected) in line.values.iter().enumerate() {
                let col = FIRST_PERIOD_COLUMN + i as u16;
                let actual = sheet.grid.get(row, col).and_then(|c| c.value.as_number());
                assert_eq!(actual, *expected, "{} / {}", line.label, table.periods()[i]);
            }
        }
    }

    #[test]
    fn test_other_section_rendered_last() {
        let mut table = StatementTable::new(periods()).unwrap();
        table.push_row("Mystery", vec![Some(1.0), Some(1.0)]).unwrap();
        table.push_row("Asset A", vec![Some(1.0), Some(1.0)]).unwrap();
        let sheet = render(&table, &two_section_rules());

        assert_eq!(sheet.banner_row("Assets"), Some(3));
        assert_eq!(sheet.banner_row("Other"), Some(6));
        assert_eq!(sheet.banner_row("Liabilities"), None);
    }
}
