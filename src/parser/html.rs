use std::collections::HashSet;
use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{collapse_ws, resolve_headers, Field, Orientation, RawTable};
use crate::config::ARCHIVE_NAME;
use crate::error::ExtractError;

static LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("caption, h1, h2, h3, h4, h5, h6, strong, b").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Lowercase text a label must contain to mark the summary table.
const TABLE_LABEL: &str = "top 10 models";

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlExtraction {
    pub table: RawTable,
    pub archive_link: Option<String>,
}

/// Locate the Top-10 table in a result page and pull its cells.
///
/// `page_url` is only used to resolve a relative archive link.
pub fn extract(body: &str, page_url: &str) -> Result<HtmlExtraction, ExtractError> {
    let doc = parse(body)?;
    let table = locate_table(&doc)?;
    let grid = table_grid(table);
    let table = orient(grid)?;
    let archive_link = find_archive_link(&doc, page_url);
    Ok(HtmlExtraction {
        table,
        archive_link,
    })
}

fn parse(body: &str) -> Result<Html, ExtractError> {
    if !body.contains('<') {
        return Err(ExtractError::MalformedDocument("no markup in response".into()));
    }
    let doc = Html::parse_document(body);
    let has_content = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| !matches!(e.value().name(), "html" | "head" | "body"));
    if !has_content {
        return Err(ExtractError::MalformedDocument("no elements in document".into()));
    }
    Ok(doc)
}

fn element_text(el: ElementRef) -> String {
    collapse_ws(&el.text().collect::<String>())
}

fn locate_table(doc: &Html) -> Result<ElementRef<'_>, ExtractError> {
    doc.select(&LABEL_SELECTOR)
        .filter(|label| element_text(*label).to_lowercase().contains(TABLE_LABEL))
        .find_map(|label| {
            if label.value().name() == "caption" {
                label
                    .parent()
                    .and_then(ElementRef::wrap)
                    .filter(|p| p.value().name() == "table")
            } else {
                next_table(doc, label)
            }
        })
        .ok_or_else(|| ExtractError::TableNotFound("no \"Top 10 Models\" heading".into()))
}

/// First `<table>` after `label` in document order.
fn next_table<'a>(doc: &'a Html, label: ElementRef<'a>) -> Option<ElementRef<'a>> {
    doc.tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != label.id())
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table" && !label.descendants().any(|d| d.id() == e.id()))
}

fn table_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn table_grid(table: ElementRef) -> Vec<Vec<String>> {
    table_rows(table)
        .into_iter()
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .map(element_text)
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect()
}

fn names_every_field(headers: &[Option<Field>]) -> bool {
    let found: HashSet<Field> = headers.iter().flatten().copied().collect();
    found.len() == Field::ALL.len()
}

/// Header row first, then header column.
fn orient(grid: Vec<Vec<String>>) -> Result<RawTable, ExtractError> {
    let first_row = grid.first().map(|row| resolve_headers(row.as_slice())).unwrap_or_default();
    if names_every_field(&first_row) {
        return Ok(RawTable {
            orientation: Orientation::RowOriented,
            fields: first_row,
            records: grid.into_iter().skip(1).collect(),
        });
    }

    let heads: Vec<&str> = grid
        .iter()
        .map(|row| row.first().map(String::as_str).unwrap_or_default())
        .collect();
    let first_col = resolve_headers(&heads);
    if names_every_field(&first_col) {
        return Ok(RawTable {
            orientation: Orientation::ColumnOriented,
            fields: first_col,
            records: grid.into_iter().map(|row| row.into_iter().skip(1).collect()).collect(),
        });
    }

    Err(ExtractError::IncompleteTable(
        "neither the first row nor the first column names all five fields".into(),
    ))
}

fn find_archive_link(doc: &Html, page_url: &str) -> Option<String> {
    let href = doc
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            let path = href.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next() == Some(ARCHIVE_NAME)
        })?;

    match Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Some(href.to_string()),
    }
}
