pub mod html;
pub mod normalize;
pub mod plaintext;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)\s*$").unwrap());

/// The five columns of a Top-10 summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Rank,
    DockingScore,
    ConfidenceScore,
    LigandRmsd,
    InterfaceResidues,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Rank,
        Field::DockingScore,
        Field::ConfidenceScore,
        Field::LigandRmsd,
        Field::InterfaceResidues,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Rank => "Rank",
            Field::DockingScore => "Docking Score",
            Field::ConfidenceScore => "Confidence Score",
            Field::LigandRmsd => "Ligand RMSD",
            Field::InterfaceResidues => "Interface residues",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::Rank => 0,
            Field::DockingScore => 1,
            Field::ConfidenceScore => 2,
            Field::LigandRmsd => 3,
            Field::InterfaceResidues => 4,
        }
    }

    /// Match a header cell against the synonym table.
    ///
    /// Case-insensitive, whitespace-collapsed, ignoring a trailing colon and a
    /// parenthesized unit such as `(Å)`. Anything not listed is not a header.
    pub fn from_header(text: &str) -> Option<Field> {
        let key = header_key(text);
        if key.is_empty() {
            return None;
        }
        HEADER_SYNONYMS
            .iter()
            .find(|(_, names)| names.contains(&key.as_str()))
            .map(|(field, _)| *field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recognized header spellings, lowercase and whitespace-collapsed.
pub const HEADER_SYNONYMS: [(Field, &[&str]); 5] = [
    (Field::Rank, &["rank", "#", "model"]),
    (
        Field::DockingScore,
        &["docking score", "docking", "dock score", "dock", "score"],
    ),
    (
        Field::ConfidenceScore,
        &["confidence score", "confidence", "conf score", "conf"],
    ),
    (Field::LigandRmsd, &["ligand rmsd", "rmsd", "lig rmsd"]),
    (
        Field::InterfaceResidues,
        &["interface residues", "interface residue", "interface", "residues"],
    ),
];

/// Map a run of header cells to fields, one field per cell at most.
///
/// When several cells name the same field, a canonical label ("Rank") beats a
/// synonym ("Model"); otherwise the first wins. Losers map to `None`.
pub fn resolve_headers<S: AsRef<str>>(headers: &[S]) -> Vec<Option<Field>> {
    let mut fields: Vec<Option<Field>> = headers.iter().map(|h| Field::from_header(h.as_ref())).collect();

    for field in Field::ALL {
        let claims: Vec<usize> = (0..fields.len()).filter(|&i| fields[i] == Some(field)).collect();
        if claims.len() < 2 {
            continue;
        }
        let canonical = field.label().to_lowercase();
        let keep = claims
            .iter()
            .copied()
            .find(|&i| header_key(headers[i].as_ref()) == canonical)
            .unwrap_or(claims[0]);
        for i in claims.into_iter().filter(|&i| i != keep) {
            fields[i] = None;
        }
    }

    fields
}

fn header_key(text: &str) -> String {
    let lower = collapse_ws(text).to_lowercase();
    let trimmed = lower.trim_end_matches(':').trim_end();
    UNIT_RE.replace(trimmed, "").trim().to_string()
}

/// Trim and squeeze every run of whitespace to a single space.
pub fn collapse_ws(text: &str) -> String {
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// How physical rows map to logical records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// One physical row per ranked model.
    RowOriented,
    /// One physical row per field, one column per ranked model.
    ColumnOriented,
}

/// Cells recovered by an extractor, before type coercion.
///
/// For `RowOriented`, `fields[i]` names column `i` of every record. For
/// `ColumnOriented`, `fields[i]` names physical row `i` and `records[i]` holds
/// that row's values, one per rank. Unrecognized columns/rows are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub orientation: Orientation,
    pub fields: Vec<Option<Field>>,
    pub records: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_synonyms_match() {
        assert_eq!(Field::from_header("Rank"), Some(Field::Rank));
        assert_eq!(Field::from_header("  Docking   Score "), Some(Field::DockingScore));
        assert_eq!(Field::from_header("Score"), Some(Field::DockingScore));
        assert_eq!(Field::from_header("Ligand RMSD (Å)"), Some(Field::LigandRmsd));
        assert_eq!(Field::from_header("Confidence score:"), Some(Field::ConfidenceScore));
        assert_eq!(Field::from_header("INTERFACE RESIDUES"), Some(Field::InterfaceResidues));
        assert_eq!(Field::from_header("#"), Some(Field::Rank));
    }

    #[test]
    fn unknown_headers_rejected() {
        assert_eq!(Field::from_header(""), None);
        assert_eq!(Field::from_header("Energy"), None);
        assert_eq!(Field::from_header("docking scores"), None);
        assert_eq!(Field::from_header("1"), None);
    }

    #[test]
    fn canonical_header_beats_synonym() {
        assert_eq!(
            resolve_headers(&["Model", "Rank", "Score", "Docking Score:"]),
            vec![None, Some(Field::Rank), None, Some(Field::DockingScore)]
        );
        assert_eq!(
            resolve_headers(&["#", "model", "rmsd"]),
            vec![Some(Field::Rank), None, Some(Field::LigandRmsd)]
        );
    }

    #[test]
    fn collapse_whitespace() {
        assert_eq!(collapse_ws("  A:12,\n\t A:15  "), "A:12, A:15");
    }
}
