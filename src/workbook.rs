use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

use crate::config::{ARCHIVE_NAME, SHEET_NAME};
use crate::model::{JobResult, JobStatus, RankedRow, WorkbookModel};
use crate::parser::Field;

pub const LINK_LABEL: &str = "All results package";
const STATUS_LABEL: &str = "Status";

/// One spreadsheet cell, independent of the output format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Heading(String),
    Text(String),
    Number(f64),
    Link { url: String, text: String },
}

pub type Grid = Vec<Vec<Cell>>;

/// Lay out every job as a block: id, one row per field across the ranks,
/// the archive link, then a blank separator. Failed jobs get id + status.
pub fn render(model: &WorkbookModel) -> Grid {
    let mut grid = Grid::new();
    for job in &model.jobs {
        render_job(job, &mut grid);
        grid.push(Vec::new());
    }
    grid
}

fn render_job(job: &JobResult, grid: &mut Grid) {
    grid.push(vec![Cell::Heading(job.spec.complex_id.clone())]);

    if let JobStatus::Failure { reason } = &job.status {
        grid.push(vec![
            Cell::Text(STATUS_LABEL.to_string()),
            Cell::Text(format!("Failed: {}", reason)),
        ]);
        return;
    }

    for field in Field::ALL {
        let mut row = vec![Cell::Text(field.label().to_string())];
        row.extend(job.rows.iter().map(|r| field_cell(r, field)));
        grid.push(row);
    }

    let link = match &job.archive_link {
        Some(url) => Cell::Link {
            url: url.clone(),
            text: ARCHIVE_NAME.to_string(),
        },
        None => Cell::Empty,
    };
    grid.push(vec![Cell::Text(LINK_LABEL.to_string()), link]);
}

fn field_cell(row: &RankedRow, field: Field) -> Cell {
    match field {
        Field::Rank => Cell::Number(row.rank as f64),
        Field::DockingScore => Cell::Number(row.docking_score),
        Field::ConfidenceScore => Cell::Number(row.confidence_score),
        Field::LigandRmsd => Cell::Number(row.ligand_rmsd),
        Field::InterfaceResidues => Cell::Text(row.interface_residues.clone()),
    }
}

/// Write the grid to a single "Summary" worksheet.
pub fn write_xlsx(grid: &Grid, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(0, 22)?;

    for (r, row) in grid.iter().enumerate() {
        let r = u32::try_from(r).context("too many rows for a worksheet")?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).context("too many columns for a worksheet")?;
            match cell {
                Cell::Empty => {}
                Cell::Heading(text) => {
                    sheet.write_string_with_format(r, c, text, &bold)?;
                }
                Cell::Text(text) => {
                    sheet.write_string(r, c, text)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Link { url, text } => {
                    sheet.write_url_with_text(r, c, url.as_str(), text)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook {}", path.display()))?;
    Ok(())
}

/// Dump the model as pretty JSON for downstream tooling.
pub fn write_json(model: &WorkbookModel, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(model)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
