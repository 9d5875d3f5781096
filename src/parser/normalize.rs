use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::{Field, Orientation, RawTable};
use crate::config::MAX_ROWS;
use crate::error::ExtractError;
use crate::model::RankedRow;

static NUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

type Slots<'a> = [Option<&'a str>; 5];

/// Turn raw cells into ranked rows, sorted by source rank, capped at ten and
/// renumbered 1..N.
pub fn normalize(table: &RawTable) -> Result<Vec<RankedRow>, ExtractError> {
    let slots = match table.orientation {
        Orientation::RowOriented => row_slots(table),
        Orientation::ColumnOriented => column_slots(table),
    };
    if slots.is_empty() {
        return Err(ExtractError::IncompleteTable("no data rows".into()));
    }

    let mut rows = slots
        .iter()
        .enumerate()
        .map(|(i, s)| to_row(i, s))
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by_key(|r| r.rank);
    if let Some(dup) = rows.windows(2).find(|w| w[0].rank == w[1].rank) {
        return Err(ExtractError::MalformedCell {
            field: Field::Rank,
            value: dup[0].rank.to_string(),
        });
    }
    rows.truncate(MAX_ROWS);

    // Ranks are positions: 1..N with no gaps, whatever the source skipped.
    for (pos, row) in (1..).zip(rows.iter_mut()) {
        if row.rank != pos {
            warn!("source rank {} renumbered to {}", row.rank, pos);
            row.rank = pos;
        }
    }

    Ok(rows)
}

fn row_slots(table: &RawTable) -> Vec<Slots<'_>> {
    table
        .records
        .iter()
        .map(|record| {
            let mut slot: Slots = [None; 5];
            for (i, field) in table.fields.iter().enumerate() {
                let Some(field) = field else { continue };
                if slot[field.index()].is_none() {
                    slot[field.index()] = record.get(i).map(String::as_str);
                }
            }
            slot
        })
        .collect()
}

// Transpose: physical row i carries one field across every rank.
fn column_slots(table: &RawTable) -> Vec<Slots<'_>> {
    let width = table
        .fields
        .iter()
        .zip(&table.records)
        .filter(|(f, _)| f.is_some())
        .map(|(_, r)| r.len())
        .max()
        .unwrap_or(0);

    let mut slots: Vec<Slots> = vec![[None; 5]; width];
    for (field, record) in table.fields.iter().zip(&table.records) {
        let Some(field) = field else { continue };
        for (k, cell) in record.iter().enumerate() {
            if slots[k][field.index()].is_none() {
                slots[k][field.index()] = Some(cell.as_str());
            }
        }
    }
    slots
}

fn to_row(pos: usize, slot: &Slots) -> Result<RankedRow, ExtractError> {
    let rank_cell = require(pos, slot, Field::Rank)?;
    let rank = rank_cell
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|r| *r > 0)
        .ok_or_else(|| ExtractError::MalformedCell {
            field: Field::Rank,
            value: rank_cell.to_string(),
        })?;

    Ok(RankedRow {
        rank,
        docking_score: number(pos, slot, Field::DockingScore)?,
        confidence_score: number(pos, slot, Field::ConfidenceScore)?,
        ligand_rmsd: number(pos, slot, Field::LigandRmsd)?,
        interface_residues: slot[Field::InterfaceResidues.index()]
            .ok_or_else(|| missing(pos, Field::InterfaceResidues))?
            .to_string(),
    })
}

fn require<'a>(pos: usize, slot: &Slots<'a>, field: Field) -> Result<&'a str, ExtractError> {
    match slot[field.index()] {
        Some(cell) if !cell.trim().is_empty() => Ok(cell),
        _ => Err(missing(pos, field)),
    }
}

fn missing(pos: usize, field: Field) -> ExtractError {
    ExtractError::IncompleteTable(format!("record {} has no {}", pos + 1, field))
}

fn number(pos: usize, slot: &Slots, field: Field) -> Result<f64, ExtractError> {
    let cell = require(pos, slot, field)?;
    parse_number(cell).ok_or_else(|| ExtractError::MalformedCell {
        field,
        value: cell.to_string(),
    })
}

/// Plain decimal with optional sign and exponent. No grouping separators.
pub fn parse_number(cell: &str) -> Option<f64> {
    let s = cell.trim().replace('\u{2212}', "-");
    if !NUM_RE.is_match(&s) {
        return None;
    }
    s.parse().ok()
}
