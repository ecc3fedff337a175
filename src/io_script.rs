//! Parser for the script-era dataset members.
//!
//! Before the spreadsheet distribution, the Wahl-O-Mat archives shipped the
//! tables as a script file made of bracketed array assignments, one
//! statement per line:
//!
//! ```text
//! partei[3][1][1]='GRÜNE';
//! these[12][0][0]='Tempolimit';
//! antwort[12][3]='-1';
//! ```
//!
//! Two format generations exist. They differ in the bracket arity of the
//! statement lines, and the generation is fixed once per archive by the
//! member filename, never re-derived per line.

use encoding_rs::mem::decode_latin1;
use log::debug;
use snafu::{ensure, OptionExt};

use crate::dataset::MatrixBuilder;
use crate::{
    CodeOutOfRangeSnafu, Dataset, IndexOutOfRangeSnafu, MalformedLineSnafu, WomResult,
};

/// Member name of the newer script generation (three-index statement lines).
pub const SCRIPT_MEMBER_THREE_INDEX: &str = "modul_definition.js";
/// Member name of the older script generation (two-index statement lines).
pub const SCRIPT_MEMBER_TWO_INDEX: &str = "definition.js";

const PARTY_PREFIX: &str = "partei";
const STATEMENT_PREFIX: &str = "these";
const POSITION_PREFIX: &str = "antwort";

// Party lines are partei[index][field][flag]. The short name is field 1,
// and flag 1 marks a displayed party.
const PARTY_NAME_FIELD: usize = 1;
const PARTY_DISPLAYED_FLAG: usize = 1;

// Statement lines carry the short title under field 0 and the full text
// under field 1.
const STATEMENT_TITLE_FIELD: usize = 0;
const STATEMENT_TEXT_FIELD: usize = 1;

/// The script format generation of one archive.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ScriptFormat {
    /// Statement lines are `these[index][field][fmt]`; only `fmt == 0`
    /// (the short display format) lines are taken.
    ThreeIndex,
    /// Statement lines are `these[index][field]`.
    TwoIndex,
}

impl ScriptFormat {
    /// The format generation implied by an archive member name, if the
    /// member is a known script member at all.
    pub fn for_member(name: &str) -> Option<ScriptFormat> {
        let base = name.rsplit('/').next().unwrap_or(name);
        match base {
            SCRIPT_MEMBER_THREE_INDEX => Some(ScriptFormat::ThreeIndex),
            SCRIPT_MEMBER_TWO_INDEX => Some(ScriptFormat::TwoIndex),
            _ => None,
        }
    }
}

/// One decoded `name[i][j]...=value;` line.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Assignment {
    indices: Vec<usize>,
    value: String,
}

/// Parses a script member into a [`Dataset`] (with an empty note).
///
/// Two passes: the first collects party and statement names, fixing the
/// matrix dimensions; the second fills the pre-sized matrix from the
/// `antwort` lines. An assignment outside the matrix is fatal.
pub fn parse_script(raw: &[u8], format: ScriptFormat) -> WomResult<Dataset> {
    let lines = decode_lines(raw);

    let mut parties: Vec<String> = Vec::new();
    let mut statements: Vec<String> = Vec::new();
    let mut statements_long: Vec<String> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let lineno = idx + 1;
        if let Some(a) = assignment(line, PARTY_PREFIX, lineno)? {
            if a.indices.len() == 3
                && a.indices[1] == PARTY_NAME_FIELD
                && a.indices[2] == PARTY_DISPLAYED_FLAG
            {
                debug!("parse_script: line {}: party {:?}", lineno, a.value);
                parties.push(a.value);
            }
        } else if let Some(a) = assignment(line, STATEMENT_PREFIX, lineno)? {
            let field = match format {
                ScriptFormat::ThreeIndex if a.indices.len() == 3 && a.indices[2] == 0 => {
                    Some(a.indices[1])
                }
                ScriptFormat::TwoIndex if a.indices.len() == 2 => Some(a.indices[1]),
                _ => None,
            };
            match field {
                Some(STATEMENT_TITLE_FIELD) => statements.push(a.value),
                Some(STATEMENT_TEXT_FIELD) => statements_long.push(a.value),
                _ => {}
            }
        }
    }
    debug!(
        "parse_script: {} parties, {} statements",
        parties.len(),
        statements.len()
    );

    let mut positions = MatrixBuilder::new(parties.len(), statements.len());
    for (idx, line) in lines.iter().enumerate() {
        let lineno = idx + 1;
        let a = match assignment(line, POSITION_PREFIX, lineno)? {
            Some(a) => a,
            None => continue,
        };
        ensure!(
            a.indices.len() == 2,
            MalformedLineSnafu {
                lineno,
                content: line.clone(),
            }
        );
        let (statement, party) = (a.indices[0], a.indices[1]);
        let code: i64 = a
            .value
            .trim()
            .parse()
            .ok()
            .context(MalformedLineSnafu {
                lineno,
                content: line.clone(),
            })?;
        ensure!((-1..=1).contains(&code), CodeOutOfRangeSnafu { code, lineno });
        ensure!(
            positions.contains(party, statement),
            IndexOutOfRangeSnafu {
                party,
                statement,
                rows: parties.len(),
                cols: statements.len(),
                lineno,
            }
        );
        positions.set(party, statement, code as i8);
    }

    Dataset::assemble(parties, statements, statements_long, positions)
}

/// Normalizes a plain-text note member into one newline-joined string.
pub fn note_from_text(raw: &[u8]) -> String {
    decode_lines(raw).join("\n")
}

/// Splits on `\n`, strips `\r`, and decodes each line independently as
/// UTF-8 with a Latin-1 fallback. Latin-1 accepts every byte sequence, so
/// decoding is total and never aborts a load.
fn decode_lines(raw: &[u8]) -> Vec<String> {
    raw.split(|&b| b == b'\n')
        .map(|line| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            match std::str::from_utf8(line) {
                Ok(s) => s.to_owned(),
                Err(_) => decode_latin1(line).into_owned(),
            }
        })
        .collect()
}

/// Matches a line against one of the known prefixes. A line that does not
/// open with `prefix[` is skipped (script members carry unrelated code);
/// a line that does but fails the assignment grammar is fatal.
fn assignment(line: &str, prefix: &str, lineno: usize) -> WomResult<Option<Assignment>> {
    let line = line.trim();
    if !(line.starts_with(prefix) && line[prefix.len()..].starts_with('[')) {
        return Ok(None);
    }
    parse_assignment(line, prefix, lineno).map(Some)
}

fn parse_assignment(line: &str, prefix: &str, lineno: usize) -> WomResult<Assignment> {
    let malformed = || MalformedLineSnafu {
        lineno,
        content: line,
    };
    let mut rest = &line[prefix.len()..];
    let mut indices: Vec<usize> = Vec::new();
    while rest.starts_with('[') {
        let close = rest.find(']').context(malformed())?;
        let index: usize = rest[1..close].trim().parse().ok().context(malformed())?;
        indices.push(index);
        rest = &rest[close + 1..];
    }
    ensure!(!indices.is_empty(), malformed());
    let rest = rest.trim_start().strip_prefix('=').context(malformed())?;
    let rest = rest.trim().trim_end_matches(';').trim_end();
    Ok(Assignment {
        indices,
        value: unquote(rest),
    })
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WomError;

    // 2 parties x 3 statements, newer generation. Lines with the wrong
    // arity, an undisplayed party field or the long display format must
    // be skipped.
    const SAMPLE_THREE_INDEX: &str = "\
var module_version = 7;
partei[0][0]='1';
partei[0][1][1]='ADP';
partei[0][2][1]='Allgemeine Demokratische Partei';
partei[1][1][1]='BUP';
these[0][0][0]='Steuern';
these[0][1][0]='Die Steuern sollen gesenkt werden.';
these[0][0][1]='Steuern (Langformat)';
these[1][0][0]='Klima';
these[1][1][0]='Der Klimaschutz soll Vorrang haben.';
these[2][0][0]='Bildung';
these[2][1][0]='Bildung soll Ländersache bleiben.';
antwort[0][0]='1';
antwort[1][0]='0';
antwort[2][0]='-1';
antwort[0][1]=-1;
antwort[1][1]='1';
antwort[2][1]='0';
";

    // The same data in the older generation: two-index statement lines.
    const SAMPLE_TWO_INDEX: &str = "\
partei[0][1][1]='ADP';
partei[1][1][1]='BUP';
these[0][0]='Steuern';
these[0][1]='Die Steuern sollen gesenkt werden.';
these[1][0]='Klima';
these[1][1]='Der Klimaschutz soll Vorrang haben.';
these[2][0]='Bildung';
these[2][1]='Bildung soll Ländersache bleiben.';
antwort[0][0]='1';
antwort[1][0]='0';
antwort[2][0]='-1';
antwort[0][1]='-1';
antwort[1][1]='1';
antwort[2][1]='0';
";

    #[test]
    fn parses_three_index_generation() {
        let data = parse_script(SAMPLE_THREE_INDEX.as_bytes(), ScriptFormat::ThreeIndex).unwrap();
        assert_eq!(data.parties, vec!["ADP", "BUP"]);
        assert_eq!(data.statements, vec!["Steuern", "Klima", "Bildung"]);
        assert_eq!(data.statements_long.len(), 3);
        assert_eq!(data.positions.shape(), (2, 3));
        assert_eq!(data.positions.row(0), &[1, 0, -1]);
        assert_eq!(data.positions.row(1), &[-1, 1, 0]);
    }

    #[test]
    fn parses_two_index_generation() {
        let data = parse_script(SAMPLE_TWO_INDEX.as_bytes(), ScriptFormat::TwoIndex).unwrap();
        assert_eq!(data.parties, vec!["ADP", "BUP"]);
        assert_eq!(data.statements, vec!["Steuern", "Klima", "Bildung"]);
        assert_eq!(data.positions.shape(), (2, 3));
        assert_eq!(data.positions.row(1), &[-1, 1, 0]);
    }

    #[test]
    fn both_generations_agree() {
        let a = parse_script(SAMPLE_THREE_INDEX.as_bytes(), ScriptFormat::ThreeIndex).unwrap();
        let b = parse_script(SAMPLE_TWO_INDEX.as_bytes(), ScriptFormat::TwoIndex).unwrap();
        assert_eq!(a.parties, b.parties);
        assert_eq!(a.statements, b.statements);
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn latin1_fallback_decodes_invalid_utf8() {
        // 0xFC is 'ü' and 0xE4 is 'ä' in Latin-1, but not valid UTF-8.
        let mut raw: Vec<u8> = Vec::new();
        raw.extend_from_slice(b"partei[0][1][1]='B\xFCndnis f\xFCr T\xE4ler';\n");
        raw.extend_from_slice(b"these[0][0]='Steuern';\n");
        raw.extend_from_slice(b"these[0][1]='Die Steuern sollen gesenkt werden.';\n");
        raw.extend_from_slice(b"antwort[0][0]='1';\n");
        let data = parse_script(&raw, ScriptFormat::TwoIndex).unwrap();
        assert_eq!(data.parties, vec!["Bündnis für Täler"]);
    }

    #[test]
    fn member_names_select_the_generation() {
        assert_eq!(
            ScriptFormat::for_member("modul_definition.js"),
            Some(ScriptFormat::ThreeIndex)
        );
        assert_eq!(
            ScriptFormat::for_member("daten/definition.js"),
            Some(ScriptFormat::TwoIndex)
        );
        assert_eq!(ScriptFormat::for_member("anything.js"), None);
    }

    #[test]
    fn out_of_range_assignment_is_fatal() {
        let raw = "\
partei[0][1][1]='ADP';
these[0][0]='Steuern';
these[0][1]='Die Steuern sollen gesenkt werden.';
antwort[0][0]='1';
antwort[5][0]='1';
";
        let res = parse_script(raw.as_bytes(), ScriptFormat::TwoIndex);
        assert!(matches!(
            res,
            Err(WomError::IndexOutOfRange {
                party: 0,
                statement: 5,
                rows: 1,
                cols: 1,
                lineno: 5,
            })
        ));
    }

    #[test]
    fn code_outside_vocabulary_is_fatal() {
        let raw = "\
partei[0][1][1]='ADP';
these[0][0]='Steuern';
these[0][1]='Die Steuern sollen gesenkt werden.';
antwort[0][0]='2';
";
        let res = parse_script(raw.as_bytes(), ScriptFormat::TwoIndex);
        assert!(matches!(
            res,
            Err(WomError::CodeOutOfRange { code: 2, lineno: 4 })
        ));
    }

    #[test]
    fn missing_assignment_is_fatal() {
        let raw = "\
partei[0][1][1]='ADP';
partei[1][1][1]='BUP';
these[0][0]='Steuern';
these[0][1]='Die Steuern sollen gesenkt werden.';
antwort[0][0]='1';
";
        let res = parse_script(raw.as_bytes(), ScriptFormat::TwoIndex);
        assert!(matches!(
            res,
            Err(WomError::UnassignedCell {
                party: 1,
                statement: 0
            })
        ));
    }

    #[test]
    fn malformed_known_prefix_line_is_fatal() {
        let raw = "antwort[0]['x']='1';\n";
        let res = parse_script(raw.as_bytes(), ScriptFormat::TwoIndex);
        assert!(matches!(res, Err(WomError::MalformedLine { lineno: 1, .. })));
    }

    #[test]
    fn note_joins_decoded_lines() {
        let raw = b"Zeile eins\r\nZeile zwei\nZeile drei";
        assert_eq!(note_from_text(raw), "Zeile eins\nZeile zwei\nZeile drei");
    }
}
