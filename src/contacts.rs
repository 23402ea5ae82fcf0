use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TraceError};

/// Frame index within a trajectory
pub type Frame = usize;

/// Every interaction type the contact generator can emit
pub const ALL_INTERACTION_TYPES: [&str; 16] = [
    "sb", "pc", "ps", "ts", "vdw", "hb", "lhb", "hbbb", "hbsb", "hbss", "wb", "wb2", "hls", "hlb",
    "lwb", "lwb2",
];

/// One observed contact between two (or more, for bridged contacts) atoms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub frame: Frame,
    pub interaction_type: String,
    pub atom_0: String,
    pub atom_1: String,
    /// Bridging atoms of water-mediated contacts, in file order
    pub extra_atoms: Vec<String>,
}

impl ContactRecord {
    pub fn new(
        frame: Frame,
        interaction_type: impl Into<String>,
        atom_0: impl Into<String>,
        atom_1: impl Into<String>,
    ) -> Self {
        Self {
            frame,
            interaction_type: interaction_type.into(),
            atom_0: atom_0.into(),
            atom_1: atom_1.into(),
            extra_atoms: Vec::new(),
        }
    }
}

/// All contacts of one input file, in file order
pub type ContactList = Vec<ContactRecord>;

/// Set of interaction-type tags a parse should keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionTypes(BTreeSet<String>);

impl InteractionTypes {
    pub fn all() -> Self {
        Self(ALL_INTERACTION_TYPES.iter().map(|t| t.to_string()).collect())
    }

    /// Parse an `--itypes`-style argument: `all` or a comma-separated tag list.
    pub fn parse(arg: &str) -> Self {
        if arg.split(',').any(|t| t.trim() == "all") {
            return Self::all();
        }
        Self(
            arg.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, itype: &str) -> bool {
        self.0.contains(itype)
    }
}

impl Default for InteractionTypes {
    fn default() -> Self {
        Self::all()
    }
}

/// A parsed contact file
#[derive(Debug, Clone)]
pub struct ContactSource {
    /// Path as given on the command line, used for display
    pub name: String,
    pub contacts: ContactList,
    /// Trajectory length declared in the file header, if any
    pub total_frames: Option<usize>,
}

impl ContactSource {
    /// Open, fully read and close a contact file.
    pub fn load(path: impl AsRef<Path>, itypes: &InteractionTypes) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let (contacts, total_frames) = parse_contacts(file, path, itypes)?;
        info!(
            file = %path.display(),
            contacts = contacts.len(),
            total_frames = ?total_frames,
            "Loaded contact file."
        );
        Ok(Self {
            name: path.display().to_string(),
            contacts,
            total_frames,
        })
    }

    /// Number of frames the trace for this source should span
    pub fn frame_span(&self) -> usize {
        let observed = self
            .contacts
            .iter()
            .map(|c| c.frame + 1)
            .max()
            .unwrap_or(0);
        observed.max(self.total_frames.unwrap_or(0))
    }
}

impl AsRef<[ContactRecord]> for ContactSource {
    fn as_ref(&self) -> &[ContactRecord] {
        &self.contacts
    }
}

/// Parse a tab-separated contact file.
///
/// Lines starting with `#` are headers; a `total_frames:N` token in them is
/// returned as the second tuple element. Every other non-empty line must be
/// `frame, itype, atom_0, atom_1[, atom_2, ...]`. Records whose type is not in
/// `itypes` are dropped.
pub fn parse_contacts<R: Read>(
    reader: R,
    path: &Path,
    itypes: &InteractionTypes,
) -> Result<(ContactList, Option<usize>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut contacts = ContactList::new();
    let mut total_frames = None;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| TraceError::ContactParse {
            path: PathBuf::from(path),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let parse_error = |message: String| TraceError::ContactParse {
            path: PathBuf::from(path),
            line,
            message,
        };

        let first = record.get(0).unwrap_or("").trim();
        if first.starts_with('#') {
            let header = record.iter().collect::<Vec<_>>().join(" ");
            if let Some(n) = parse_total_frames(&header) {
                total_frames = Some(n.map_err(parse_error)?);
            }
            continue;
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() < 4 {
            return Err(parse_error(format!(
                "expected at least 4 tab-separated fields, found {}",
                record.len()
            )));
        }

        let frame: Frame = first
            .parse()
            .map_err(|e| parse_error(format!("invalid frame index '{}': {}", first, e)))?;
        let itype = record[1].trim();
        if !itypes.contains(itype) {
            skipped += 1;
            continue;
        }

        contacts.push(ContactRecord {
            frame,
            interaction_type: itype.to_string(),
            atom_0: record[2].trim().to_string(),
            atom_1: record[3].trim().to_string(),
            extra_atoms: record.iter().skip(4).map(|a| a.trim().to_string()).collect(),
        });
    }

    if skipped > 0 {
        debug!(skipped, "Dropped contacts with unselected interaction types.");
    }

    Ok((contacts, total_frames))
}

fn parse_total_frames(header: &str) -> Option<std::result::Result<usize, String>> {
    header
        .split_whitespace()
        .find_map(|token| token.strip_prefix("total_frames:"))
        .map(|value| {
            value
                .parse()
                .map_err(|e| format!("invalid total_frames '{}': {}", value, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "# total_frames:10 beg:0 end:9 stride:1 interaction_types:hb,vdw\n\
# Columns: frame, interaction_type, atom_1, atom_2[, atom_3[, atom_4]]\n\
1\tvdw\tA:ILE:51:CD1\tA:PHE:103:CG\n\
1\thbss\tA:HIS:172:NE2\tA:GLU:143:OE1\n\
\n\
4\twb\tA:ARG:10:NH1\tA:ASP:20:OD2\tW:HOH:501:O\n";

    fn parse(text: &str, itypes: &InteractionTypes) -> Result<(ContactList, Option<usize>)> {
        parse_contacts(text.as_bytes(), Path::new("test.tsv"), itypes)
    }

    #[test]
    fn parses_records_and_header_metadata() {
        let (contacts, total) = parse(SAMPLE, &InteractionTypes::all()).unwrap();
        assert_eq!(total, Some(10));
        assert_eq!(contacts.len(), 3);
        assert_eq!(
            contacts[0],
            ContactRecord::new(1, "vdw", "A:ILE:51:CD1", "A:PHE:103:CG")
        );
        assert_eq!(contacts[2].frame, 4);
        assert_eq!(contacts[2].extra_atoms, vec!["W:HOH:501:O".to_string()]);
    }

    #[test]
    fn drops_unselected_interaction_types() {
        let (contacts, _) = parse(SAMPLE, &InteractionTypes::parse("vdw,wb")).unwrap();
        let types: Vec<_> = contacts.iter().map(|c| c.interaction_type.as_str()).collect();
        assert_eq!(types, vec!["vdw", "wb"]);
    }

    #[test]
    fn all_keyword_selects_every_type() {
        let all = InteractionTypes::parse("all");
        assert!(ALL_INTERACTION_TYPES.iter().all(|t| all.contains(t)));
        assert_eq!(InteractionTypes::parse("hb,all"), InteractionTypes::all());
        assert!(InteractionTypes::parse("hb").contains("hb"));
        assert!(!InteractionTypes::parse("hb").contains("vdw"));
    }

    #[test]
    fn missing_header_leaves_total_frames_unset() {
        let (contacts, total) = parse("0\thb\tX\tY\n", &InteractionTypes::all()).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(total, None);
    }

    #[test]
    fn short_record_is_fatal() {
        let err = parse("0\thb\tA:ALA:1:N\n", &InteractionTypes::all()).unwrap_err();
        match err {
            TraceError::ContactParse { line, message, .. } => {
                assert_eq!(line, 1);
                assert!(message.contains("at least 4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_frame_is_fatal() {
        let err = parse("x\thb\tA\tB\n", &InteractionTypes::all()).unwrap_err();
        assert!(matches!(err, TraceError::ContactParse { .. }));
        let err = parse("-3\thb\tA\tB\n", &InteractionTypes::all()).unwrap_err();
        assert!(matches!(err, TraceError::ContactParse { .. }));
    }

    #[test]
    fn invalid_utf8_reports_the_file() {
        let err = parse_contacts(
            &b"0\thb\tA:ALA:1:N\tB\n1\thb\t\xff\tB\n"[..],
            Path::new("broken.tsv"),
            &InteractionTypes::all(),
        )
        .unwrap_err();
        match &err {
            TraceError::ContactParse { path, line, .. } => {
                assert_eq!(path, Path::new("broken.tsv"));
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("broken.tsv"));
    }

    #[test]
    fn load_reads_file_and_computes_span() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = ContactSource::load(file.path(), &InteractionTypes::all()).unwrap();
        assert_eq!(source.name, file.path().display().to_string());
        assert_eq!(source.contacts.len(), 3);
        assert_eq!(source.frame_span(), 10);
    }

    #[test]
    fn span_falls_back_to_last_observed_frame() {
        let source = ContactSource {
            name: "f".to_string(),
            contacts: vec![ContactRecord::new(7, "hb", "A", "B")],
            total_frames: None,
        };
        assert_eq!(source.frame_span(), 8);
    }
}
