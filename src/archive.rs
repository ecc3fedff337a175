//! ZIP archive handling: locating and reading the dataset members.

use std::io::{Cursor, Read};

use log::debug;
use snafu::ResultExt;
use zip::ZipArchive;

use crate::io_script::{ScriptFormat, SCRIPT_MEMBER_THREE_INDEX, SCRIPT_MEMBER_TWO_INDEX};
use crate::{
    AmbiguousMemberSnafu, MemberNotFoundSnafu, OpeningArchiveSnafu, ReadingMemberSnafu, WomResult,
};

const SPREADSHEET_SUFFIX: &str = ".xlsx";
const NOTE_SUFFIX: &str = ".txt";

/// The archive member holding the positional data, with the parsing
/// strategy it calls for.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DataMember {
    Spreadsheet { name: String },
    Script { name: String, format: ScriptFormat },
}

impl DataMember {
    pub fn name(&self) -> &str {
        match self {
            DataMember::Spreadsheet { name } => name,
            DataMember::Script { name, .. } => name,
        }
    }
}

/// A dataset archive, opened from raw bytes.
pub struct WomArchive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
}

impl WomArchive {
    pub fn open(bytes: &[u8]) -> WomResult<WomArchive> {
        let zip = ZipArchive::new(Cursor::new(bytes.to_vec())).context(OpeningArchiveSnafu {})?;
        Ok(WomArchive { zip })
    }

    pub fn member_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    /// Locates the member holding the positional data: a spreadsheet or
    /// one of the two known script members. Exactly one candidate must
    /// exist; an ambiguous archive is an error, never resolved by
    /// guessing.
    pub fn locate_data_member(&self) -> WomResult<DataMember> {
        let mut candidates: Vec<DataMember> = Vec::new();
        for name in self.zip.file_names() {
            if name.ends_with(SPREADSHEET_SUFFIX) {
                candidates.push(DataMember::Spreadsheet {
                    name: name.to_string(),
                });
            } else if let Some(format) = ScriptFormat::for_member(name) {
                candidates.push(DataMember::Script {
                    name: name.to_string(),
                    format,
                });
            }
        }
        debug!("locate_data_member: candidates: {:?}", candidates);
        match candidates.as_slice() {
            [] => MemberNotFoundSnafu {
                wanted: vec![
                    SPREADSHEET_SUFFIX.to_string(),
                    SCRIPT_MEMBER_THREE_INDEX.to_string(),
                    SCRIPT_MEMBER_TWO_INDEX.to_string(),
                ],
                names: self.member_names(),
            }
            .fail(),
            [member] => Ok(member.clone()),
            _ => AmbiguousMemberSnafu {
                candidates: candidates
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect::<Vec<String>>(),
            }
            .fail(),
        }
    }

    /// The optional plain-text note member. No note member is fine;
    /// several of them is the same ambiguity error as for data members.
    pub fn note_member(&self) -> WomResult<Option<String>> {
        let candidates: Vec<String> = self
            .zip
            .file_names()
            .filter(|name| name.ends_with(NOTE_SUFFIX))
            .map(str::to_string)
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [name] => Ok(Some(name.clone())),
            _ => AmbiguousMemberSnafu { candidates }.fail(),
        }
    }

    pub fn read_member(&mut self, name: &str) -> WomResult<Vec<u8>> {
        let mut member = self.zip.by_name(name).context(OpeningArchiveSnafu {})?;
        let mut buf: Vec<u8> = Vec::new();
        member.read_to_end(&mut buf).context(ReadingMemberSnafu { name })?;
        debug!("read_member: {}: {} bytes", name, buf.len());
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WomError;
    use std::io::Write;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn locates_a_single_spreadsheet_member() {
        let bytes = zip_bytes(&[("Datensatz.xlsx", b"x"), ("readme.md", b"y")]);
        let archive = WomArchive::open(&bytes).unwrap();
        let member = archive.locate_data_member().unwrap();
        assert_eq!(
            member,
            DataMember::Spreadsheet {
                name: "Datensatz.xlsx".to_string()
            }
        );
    }

    #[test]
    fn locates_script_members_with_their_generation() {
        let bytes = zip_bytes(&[("modul_definition.js", b"x")]);
        let archive = WomArchive::open(&bytes).unwrap();
        assert_eq!(
            archive.locate_data_member().unwrap(),
            DataMember::Script {
                name: "modul_definition.js".to_string(),
                format: ScriptFormat::ThreeIndex
            }
        );

        let bytes = zip_bytes(&[("daten/definition.js", b"x")]);
        let archive = WomArchive::open(&bytes).unwrap();
        assert_eq!(
            archive.locate_data_member().unwrap(),
            DataMember::Script {
                name: "daten/definition.js".to_string(),
                format: ScriptFormat::TwoIndex
            }
        );
    }

    #[test]
    fn two_spreadsheet_members_are_ambiguous() {
        let bytes = zip_bytes(&[("a.xlsx", b"x"), ("b.xlsx", b"y")]);
        let archive = WomArchive::open(&bytes).unwrap();
        let res = archive.locate_data_member();
        assert!(matches!(res, Err(WomError::AmbiguousMember { .. })));
    }

    #[test]
    fn mixed_member_kinds_are_ambiguous() {
        let bytes = zip_bytes(&[("a.xlsx", b"x"), ("definition.js", b"y")]);
        let archive = WomArchive::open(&bytes).unwrap();
        let res = archive.locate_data_member();
        assert!(matches!(res, Err(WomError::AmbiguousMember { .. })));
    }

    #[test]
    fn missing_data_member_is_fatal() {
        let bytes = zip_bytes(&[("readme.md", b"x")]);
        let archive = WomArchive::open(&bytes).unwrap();
        let res = archive.locate_data_member();
        assert!(matches!(res, Err(WomError::MemberNotFound { .. })));
    }

    #[test]
    fn note_member_is_optional() {
        let bytes = zip_bytes(&[("definition.js", b"x")]);
        let archive = WomArchive::open(&bytes).unwrap();
        assert_eq!(archive.note_member().unwrap(), None);

        let bytes = zip_bytes(&[("definition.js", b"x"), ("hinweise.txt", b"y")]);
        let archive = WomArchive::open(&bytes).unwrap();
        assert_eq!(
            archive.note_member().unwrap(),
            Some("hinweise.txt".to_string())
        );
    }

    #[test]
    fn reads_member_bytes() {
        let bytes = zip_bytes(&[("definition.js", b"antwort[0][0]='1';")]);
        let mut archive = WomArchive::open(&bytes).unwrap();
        assert_eq!(
            archive.read_member("definition.js").unwrap(),
            b"antwort[0][0]='1';".to_vec()
        );
    }
}
