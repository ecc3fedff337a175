//! Loader for the Wahl-O-Mat questionnaire datasets published by the
//! Bundeszentrale für politische Bildung.
//!
//! The datasets are distributed as ZIP archives. Depending on the election
//! year, the positional data inside the archive is either an `.xlsx`
//! spreadsheet or a script file that declares the tables as bracketed
//! array assignments. Both forms are normalized into the same [`Dataset`]:
//! an ordered list of parties, an ordered list of statements (short titles
//! and full texts) and a dense {parties × statements} matrix of position
//! codes in {-1, 0, 1}.

use log::info;
use snafu::Snafu;

pub mod archive;
pub mod colors;
pub mod dataset;
pub mod elections;
pub mod fetch;
pub mod io_script;
pub mod io_spreadsheet;

pub use crate::archive::{DataMember, WomArchive};
pub use crate::colors::party_color;
pub use crate::dataset::{Dataset, PositionMatrix};
pub use crate::elections::election_url;
pub use crate::io_script::ScriptFormat;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum WomError {
    #[snafu(display("Could not open the archive"))]
    OpeningArchive { source: zip::result::ZipError },

    #[snafu(display("Could not read the archive member {name}"))]
    ReadingMember {
        source: std::io::Error,
        name: String,
    },

    #[snafu(display("No archive member matches {wanted:?}, members are {names:?}"))]
    MemberNotFound {
        wanted: Vec<String>,
        names: Vec<String>,
    },

    #[snafu(display("Expected exactly one data member but found {candidates:?}"))]
    AmbiguousMember { candidates: Vec<String> },

    #[snafu(display("Error opening the workbook member {name}"))]
    OpeningWorkbook {
        source: calamine::XlsxError,
        name: String,
    },

    #[snafu(display("The workbook has no worksheet at position {index}"))]
    MissingWorksheet { index: usize },

    #[snafu(display("The worksheet has no header row"))]
    EmptyWorksheet {},

    #[snafu(display("Missing column {column:?} in the data sheet"))]
    MissingColumn { column: String },

    #[snafu(display("Unexpected cell content at data row {row}: {content}"))]
    BadCell { row: usize, content: String },

    #[snafu(display("No position record for party {party} and statement {statement}"))]
    MissingPosition { party: usize, statement: usize },

    #[snafu(display("Unknown position label {label:?}"))]
    UnknownLabel { label: String },

    #[snafu(display("Malformed assignment on line {lineno}: {content}"))]
    MalformedLine { lineno: usize, content: String },

    #[snafu(display("Position code {code} on line {lineno} is outside {{-1, 0, 1}}"))]
    CodeOutOfRange { code: i64, lineno: usize },

    #[snafu(display(
        "Assignment on line {lineno} addresses party {party}, statement {statement} outside the {rows}x{cols} matrix"
    ))]
    IndexOutOfRange {
        party: usize,
        statement: usize,
        rows: usize,
        cols: usize,
        lineno: usize,
    },

    #[snafu(display("No position was assigned for party {party} and statement {statement}"))]
    UnassignedCell { party: usize, statement: usize },

    #[snafu(display("Found {titles} statement titles but {texts} long statement texts"))]
    StatementTextMismatch { titles: usize, texts: usize },

    #[snafu(display("Error fetching {url}"))]
    Fetching { source: ureq::Error, url: String },

    #[snafu(display("Could not serialize the dataset"))]
    Serializing { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type WomResult<T> = Result<T, WomError>;

/// Loads a full election dataset. The argument is either a key from the
/// election registry (see [`elections`]) or a raw URL to a dataset archive.
pub fn load_election(election: &str) -> WomResult<Dataset> {
    let url = elections::election_url(election);
    info!("load_election: {:?} -> {:?}", election, url);
    let bytes = fetch::fetch_archive(url)?;
    load_archive(&bytes)
}

/// Parses an already fetched dataset archive into a [`Dataset`].
pub fn load_archive(bytes: &[u8]) -> WomResult<Dataset> {
    let mut archive = WomArchive::open(bytes)?;
    let member = archive.locate_data_member()?;
    info!("load_archive: positional data member {:?}", member);
    let dataset = match member {
        DataMember::Spreadsheet { name } => {
            let raw = archive.read_member(&name)?;
            io_spreadsheet::read_workbook(&raw, &name)?
        }
        DataMember::Script { name, format } => {
            let raw = archive.read_member(&name)?;
            let mut dataset = io_script::parse_script(&raw, format)?;
            // The script-era archives carry the terms of use as a separate
            // plain-text member, when they carry them at all.
            if let Some(note_name) = archive.note_member()? {
                let note_raw = archive.read_member(&note_name)?;
                dataset.note = io_script::note_from_text(&note_raw);
            }
            dataset
        }
    };
    info!(
        "load_archive: {} parties x {} statements",
        dataset.parties.len(),
        dataset.statements.len()
    );
    Ok(dataset)
}

/// Extracts the terms-of-use note from an archive, which may be a different
/// archive than the one holding the positional data. Returns `None` when
/// the archive carries neither a text note nor a workbook.
pub fn load_note(bytes: &[u8]) -> WomResult<Option<String>> {
    let mut archive = WomArchive::open(bytes)?;
    if let Some(name) = archive.note_member()? {
        let raw = archive.read_member(&name)?;
        return Ok(Some(io_script::note_from_text(&raw)));
    }
    match archive.locate_data_member() {
        Ok(DataMember::Spreadsheet { name }) => {
            let raw = archive.read_member(&name)?;
            Ok(Some(io_spreadsheet::read_note(&raw, &name)?))
        }
        // A script member carries no note of its own, and an archive
        // without any data member may still legitimately be note-less.
        // Everything else (ambiguity included) propagates.
        Ok(DataMember::Script { .. }) | Err(WomError::MemberNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}
