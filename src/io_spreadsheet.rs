//! Parser for the spreadsheet dataset members.
//!
//! The recent archives ship the positional data as an `.xlsx` workbook.
//! The data table lives on the last worksheet, one row per
//! (party, statement) pair; the first worksheet holds the terms of use in
//! its first column.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::{OptionExt, ResultExt};

use crate::dataset::MatrixBuilder;
use crate::{
    BadCellSnafu, Dataset, EmptyWorksheetSnafu, MissingColumnSnafu, MissingPositionSnafu,
    MissingWorksheetSnafu, OpeningWorkbookSnafu, UnknownLabelSnafu, WomResult,
};

const COL_STATEMENT_NR: &str = "These: Nr.";
const COL_PARTY_NR: &str = "Partei: Nr.";
const COL_PARTY_NAME: &str = "Partei: Kurzbezeichnung";
const COL_STATEMENT_TITLE: &str = "These: Titel";
const COL_STATEMENT_TEXT: &str = "These: These";
const COL_POSITION: &str = "Position: Position";

/// Parses a workbook member into a [`Dataset`], note attached.
pub fn read_workbook(bytes: &[u8], name: &str) -> WomResult<Dataset> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).context(OpeningWorkbookSnafu { name })?;
    let n_sheets = workbook.sheet_names().len();
    debug!("read_workbook: {}: {} worksheets", name, n_sheets);
    let data_range = worksheet_at(&mut workbook, n_sheets.saturating_sub(1), name)?;
    let note_range = worksheet_at(&mut workbook, 0, name)?;
    let mut dataset = convert_range(&data_range)?;
    dataset.note = note_from_range(&note_range);
    Ok(dataset)
}

/// Extracts only the terms-of-use note (first worksheet, first column).
pub fn read_note(bytes: &[u8], name: &str) -> WomResult<String> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes.to_vec())).context(OpeningWorkbookSnafu { name })?;
    let note_range = worksheet_at(&mut workbook, 0, name)?;
    Ok(note_from_range(&note_range))
}

fn worksheet_at(
    workbook: &mut Xlsx<Cursor<Vec<u8>>>,
    index: usize,
    name: &str,
) -> WomResult<Range<DataType>> {
    workbook
        .worksheet_range_at(index)
        .context(MissingWorksheetSnafu { index })?
        .context(OpeningWorkbookSnafu { name })
}

/// One data row, after coercion of the index columns.
#[derive(Eq, PartialEq, Debug, Clone)]
struct PositionRecord {
    statement_nr: i64,
    party_nr: i64,
    party: String,
    title: String,
    text: String,
    label: String,
}

/// Converts the data table into a [`Dataset`] (with an empty note).
///
/// Rows without a statement number are dropped. Some source files carry
/// spurious rows after a blank section; the table is truncated at the
/// first successive-row gap larger than one.
pub fn convert_range(range: &Range<DataType>) -> WomResult<Dataset> {
    let mut rows = range.rows();
    let header = rows.next().context(EmptyWorksheetSnafu {})?;
    let c_statement_nr = column_index(header, COL_STATEMENT_NR)?;
    let c_party_nr = column_index(header, COL_PARTY_NR)?;
    let c_party = column_index(header, COL_PARTY_NAME)?;
    let c_title = column_index(header, COL_STATEMENT_TITLE)?;
    let c_text = column_index(header, COL_STATEMENT_TEXT)?;
    let c_label = column_index(header, COL_POSITION)?;

    let mut records: Vec<(usize, PositionRecord)> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let rowno = idx + 1;
        let statement_nr = match int_cell(row.get(c_statement_nr)) {
            Some(nr) => nr,
            None => continue,
        };
        let record = PositionRecord {
            statement_nr,
            party_nr: int_cell(row.get(c_party_nr)).context(BadCellSnafu {
                row: rowno,
                content: cell_repr(row.get(c_party_nr)),
            })?,
            party: string_cell(row.get(c_party)).context(BadCellSnafu {
                row: rowno,
                content: cell_repr(row.get(c_party)),
            })?,
            title: string_cell(row.get(c_title)).context(BadCellSnafu {
                row: rowno,
                content: cell_repr(row.get(c_title)),
            })?,
            text: string_cell(row.get(c_text)).context(BadCellSnafu {
                row: rowno,
                content: cell_repr(row.get(c_text)),
            })?,
            label: string_cell(row.get(c_label)).context(BadCellSnafu {
                row: rowno,
                content: cell_repr(row.get(c_label)),
            })?,
        };
        records.push((rowno, record));
    }

    // Truncate at the first gap in the kept row numbers (trailing blank
    // sections in some source files are followed by spurious rows).
    let mut cut = records.len();
    for k in 1..records.len() {
        if records[k].0 - records[k - 1].0 > 1 {
            debug!("convert_range: truncating {} rows at gap", records.len() - k);
            cut = k;
            break;
        }
    }
    records.truncate(cut);

    let mut parties: Vec<String> = Vec::new();
    let mut statements: Vec<String> = Vec::new();
    let mut statements_long: Vec<String> = Vec::new();
    for (_, record) in records.iter() {
        if !parties.contains(&record.party) {
            parties.push(record.party.clone());
        }
        if !statements.contains(&record.title) {
            statements.push(record.title.clone());
        }
        if !statements_long.contains(&record.text) {
            statements_long.push(record.text.clone());
        }
    }
    debug!(
        "convert_range: {} parties, {} statements, {} records",
        parties.len(),
        statements.len(),
        records.len()
    );

    // Source numbering is 1-based; the first record for a pair wins.
    let mut labels: HashMap<(i64, i64), &str> = HashMap::new();
    for (_, record) in records.iter() {
        labels
            .entry((record.party_nr, record.statement_nr))
            .or_insert(record.label.as_str());
    }

    let mut positions = MatrixBuilder::new(parties.len(), statements.len());
    for i in 0..parties.len() {
        for j in 0..statements.len() {
            let label = labels
                .get(&((i + 1) as i64, (j + 1) as i64))
                .context(MissingPositionSnafu {
                    party: i + 1,
                    statement: j + 1,
                })?;
            positions.set(i, j, position_code(label)?);
        }
    }

    Dataset::assemble(parties, statements, statements_long, positions)
}

/// Maps a position label onto its code. The vocabulary is fixed and
/// matched case-insensitively; any other label is fatal.
pub fn position_code(label: &str) -> WomResult<i8> {
    match label.trim().to_lowercase().as_str() {
        "stimme zu" => Ok(1),
        "neutral" => Ok(0),
        "stimme nicht zu" => Ok(-1),
        _ => UnknownLabelSnafu { label }.fail(),
    }
}

/// The terms of use: first-column string cells joined with newlines,
/// non-string cells becoming empty lines.
pub fn note_from_range(range: &Range<DataType>) -> String {
    let lines: Vec<String> = range
        .rows()
        .map(|row| match row.first() {
            Some(DataType::String(s)) => s.clone(),
            _ => String::new(),
        })
        .collect();
    lines.join("\n")
}

/// Finds the position of a named column in the header row.
fn column_index(header: &[DataType], column: &str) -> WomResult<usize> {
    header
        .iter()
        .position(|cell| matches!(cell, DataType::String(s) if s == column))
        .context(MissingColumnSnafu { column })
}

fn int_cell(cell: Option<&DataType>) -> Option<i64> {
    match cell? {
        DataType::Int(i) => Some(*i),
        DataType::Float(f) => Some(*f as i64),
        DataType::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_cell(cell: Option<&DataType>) -> Option<String> {
    match cell? {
        DataType::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn cell_repr(cell: Option<&DataType>) -> String {
    format!("{:?}", cell)
}
