use std::collections::HashSet;

use tracing::{debug, warn};

use super::normalize::parse_number;
use super::{resolve_headers, Field, Orientation, RawTable};
use crate::config::MAX_ROWS;
use crate::error::ExtractError;

/// Longest multi-word header name, in whitespace tokens (e.g. "Ligand RMSD (Å)").
const MAX_HEADER_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Pipe,
    Whitespace,
}

impl Delimiter {
    fn detect(header: &str) -> Self {
        if header.contains('\t') {
            Delimiter::Tab
        } else if header.contains('|') {
            Delimiter::Pipe
        } else {
            Delimiter::Whitespace
        }
    }

    fn split(self, line: &str) -> Vec<String> {
        match self {
            Delimiter::Tab => line.split('\t').map(|c| c.trim().to_string()).collect(),
            Delimiter::Pipe => line
                .trim()
                .trim_matches('|')
                .split('|')
                .map(|c| c.trim().to_string())
                .collect(),
            Delimiter::Whitespace => line.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Parse a `ranked_poses`-style listing into row-oriented cells.
///
/// Everything before the first header line is ignored. Data lines whose cell
/// count differs from the header's are dropped unless the difference sits in a
/// trailing residues column; at most ten are kept.
pub fn extract(body: &str) -> Result<RawTable, ExtractError> {
    let mut lines = body
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (header_line, delimiter, fields) = lines
        .by_ref()
        .find_map(|(n, l)| parse_header(l).map(|(d, f)| (n, d, f)))
        .ok_or_else(|| ExtractError::TableNotFound("no header line in listing".into()))?;
    debug!("header on line {}: {:?} ({:?})", header_line, fields, delimiter);

    let mut records = Vec::new();
    for (n, line) in lines {
        if records.len() == MAX_ROWS {
            break;
        }
        let cells = delimiter.split(line);
        let found = cells.len();
        let cells = if found == fields.len() {
            Some(cells)
        } else {
            fit_residues(delimiter, &fields, cells)
        };
        match cells {
            Some(cells) => records.push(cells),
            None => warn!(
                "line {}: expected {} cells, found {}; skipped",
                n,
                fields.len(),
                found
            ),
        }
    }

    Ok(RawTable {
        orientation: Orientation::RowOriented,
        fields,
        records,
    })
}

/// A line is a header when it names the rank column and at least two of the
/// three score columns.
fn parse_header(line: &str) -> Option<(Delimiter, Vec<Option<Field>>)> {
    let line = strip_comment_marker(line.trim());
    let delimiter = Delimiter::detect(line);
    let fields = match delimiter {
        Delimiter::Whitespace => resolve_headers(&merge_tokens(&delimiter.split(line))),
        _ => resolve_headers(&delimiter.split(line)),
    };

    let named: HashSet<Field> = fields.iter().flatten().copied().collect();
    let scores = [Field::DockingScore, Field::ConfidenceScore, Field::LigandRmsd]
        .iter()
        .filter(|f| named.contains(f))
        .count();
    if named.contains(&Field::Rank) && scores >= 2 {
        Some((delimiter, fields))
    } else {
        None
    }
}

/// Whitespace rows with a trailing residues column: an empty list leaves the
/// row one cell short, and a list like "A:3, B:4" spills over into extra cells.
/// The reshaped row is kept only if its numeric columns still parse.
fn fit_residues(
    delimiter: Delimiter,
    fields: &[Option<Field>],
    mut cells: Vec<String>,
) -> Option<Vec<String>> {
    if delimiter != Delimiter::Whitespace || fields.last() != Some(&Some(Field::InterfaceResidues)) {
        return None;
    }
    let last = fields.len() - 1;
    if cells.len() == last {
        cells.push(String::new());
    } else if cells.len() > fields.len() {
        let residues = cells.split_off(last).join(" ");
        cells.push(residues);
    } else {
        return None;
    }

    let numeric = fields[..last]
        .iter()
        .zip(&cells)
        .all(|(field, cell)| field.is_none() || parse_number(cell).is_some());
    numeric.then_some(cells)
}

// "# Rank Score ..." comments out the header; "# Score ..." uses "#" as the rank column.
fn strip_comment_marker(line: &str) -> &str {
    match line.strip_prefix('#') {
        Some(rest) if rest.split_whitespace().next().and_then(Field::from_header) == Some(Field::Rank) => {
            rest.trim_start()
        }
        _ => line,
    }
}

/// Group whitespace tokens into header columns, longest synonym first.
fn merge_tokens(tokens: &[String]) -> Vec<String> {
    let mut columns = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if is_unit(&tokens[i]) && !columns.is_empty() {
            i += 1;
            continue;
        }

        let n = (1..=MAX_HEADER_TOKENS.min(tokens.len() - i))
            .rev()
            .find(|&n| Field::from_header(&tokens[i..i + n].join(" ")).is_some())
            .unwrap_or(1);
        columns.push(tokens[i..i + n].join(" "));
        i += n;
    }

    columns
}

fn is_unit(token: &str) -> bool {
    token.starts_with('(') && token.ends_with(')')
}
