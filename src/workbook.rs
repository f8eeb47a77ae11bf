// 📗 Workbook Writer - styled grids -> .xlsx
//
// The whole workbook is built and serialized in memory, written to a sibling
// temp file and renamed into place. A failed run leaves no output behind.

use crate::error::{ReportError, Result};
use crate::grid::{CellValue, Fill, Role, StyleTag};
use crate::render::{RenderedSheet, NUMBER_FORMAT};
use log::{debug, info};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const BANNER_FILL: u32 = 0x2F5597;
const BAND_FILL: u32 = 0xF2F2F2;
const UNITS_FONT: u32 = 0x666666;
const TITLE_FONT_SIZE: f64 = 14.0;

/// Concrete format for a style tag. This is the only place colors and fonts live.
pub fn style_format(tag: &StyleTag) -> Format {
    let mut format = match tag.role {
        Role::Title => Format::new()
            .set_bold()
            .set_font_size(TITLE_FONT_SIZE)
            .set_align(FormatAlign::Left),
        Role::Units => Format::new()
            .set_bold()
            .set_font_color(Color::RGB(UNITS_FONT))
            .set_align(FormatAlign::Right),
        Role::Header => Format::new().set_bold().set_align(FormatAlign::Center),
        Role::Banner => Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_align(FormatAlign::Left),
        Role::Label => Format::new().set_align(FormatAlign::Left),
        Role::Value => Format::new(),
    };

    format = match tag.fill {
        Fill::None => format,
        Fill::Banner => format.set_background_color(Color::RGB(BANNER_FILL)),
        Fill::Band => format.set_background_color(Color::RGB(BAND_FILL)),
    };

    if tag.numeric {
        format = format.set_num_format(NUMBER_FORMAT).set_align(FormatAlign::Right);
    }

    format
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &RenderedSheet) -> Result<usize> {
    worksheet.set_name(&sheet.name)?;

    let mut formats: HashMap<StyleTag, Format> = HashMap::new();
    let mut written = 0;

    for (row, col, cell) in sheet.grid.cells() {
        let format = formats
            .entry(cell.style)
            .or_insert_with(|| style_format(&cell.style));

        // Grid is 1-based, rust_xlsxwriter is 0-based
        let (r, c) = (row - 1, col - 1);
        match &cell.value {
            CellValue::Text(s) => {
                worksheet.write_string_with_format(r, c, s.as_str(), format)?;
            }
            CellValue::Number(n) => {
                worksheet.write_number_with_format(r, c, *n, format)?;
            }
            CellValue::Blank => {
                worksheet.write_blank(r, c, format)?;
            }
        }
        written += 1;
    }

    for (&col, &width) in &sheet.layout.column_widths {
        worksheet.set_column_width(col - 1, width)?;
    }

    if let Some(freeze) = sheet.layout.freeze {
        worksheet.set_freeze_panes(freeze.rows, freeze.columns)?;
    }

    Ok(written)
}

/// Build every sheet into one in-memory workbook.
pub fn build_workbook(sheets: &[RenderedSheet]) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        let cells = write_sheet(worksheet, sheet)?;
        debug!("Sheet '{}': {} cells", sheet.name, cells);
    }

    Ok(workbook)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("report.xlsx");
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write all sheets to `path` in one step, or not at all.
pub fn write_workbook(sheets: &[RenderedSheet], path: &Path) -> Result<()> {
    let mut workbook = build_workbook(sheets)?;
    let buffer = workbook.save_to_buffer()?;

    let tmp = temp_path(path);
    let result = fs::write(&tmp, &buffer)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| ReportError::io(path.display().to_string(), e));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    } else {
        info!("Wrote {} ({} sheets, {} bytes)", path.display(), sheets.len(), buffer.len());
    }

    result
}
