//! draw.io diagram parser.
//!
//! Converts exported draw.io XML into an [`ImportPayload`] of tables, columns
//! and relations. Parsing is pure and deterministic: no I/O happens here, and
//! identical markup always yields an identical payload. Persistence is the
//! import service's job.
//!
//! The diagram conventions recognized here match the entity-relationship
//! shapes draw.io produces: table boxes carry a `table-` id prefix, field
//! rows a `field-` prefix and a `parent` pointing at their box, and
//! relations are edges whose `source`/`target` reference field cells.

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{DiagramColumn, DiagramRelation, DiagramTable, ImportPayload, RelationType};

/// Cell id prefix marking a table box.
const TABLE_ID_PREFIX: &str = "table-";
/// Cell id prefix marking a field row inside a table box.
const FIELD_ID_PREFIX: &str = "field-";
/// Glyph draw.io templates put in front of primary-key fields.
const PK_GLYPH: char = '\u{1F511}';
/// Glyph marking a field that labels a relation edge.
const LINK_GLYPH: char = '\u{1F517}';
/// Arrow used inside relation labels; the label is cut at the arrow.
const ARROW_GLYPH: char = '\u{2192}';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Diagram markup is empty")]
    EmptyInput,
    #[error("Diagram markup is not well-formed XML: {0}")]
    InvalidMarkup(String),
}

/// Raw mxCell attributes, before any interpretation.
#[derive(Debug, Clone, Default)]
struct RawCell {
    id: String,
    value: String,
    style: String,
    parent: String,
    source: Option<String>,
    target: Option<String>,
    vertex: bool,
    edge: bool,
}

/// A field row after label parsing.
#[derive(Debug, Clone)]
struct ParsedField {
    name: String,
    field_type: Option<String>,
    is_primary_key: bool,
    relation_label: bool,
}

/// Parse draw.io XML into an import payload.
///
/// Fails with [`ParseError::EmptyInput`] on blank input and
/// [`ParseError::InvalidMarkup`] when the XML itself cannot be read. Markup
/// that parses but contains no recognizable tables yields an empty payload,
/// which the import service rejects separately.
pub fn parse(raw_markup: &str) -> Result<ImportPayload, ParseError> {
    if raw_markup.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let cells = collect_cells(raw_markup)?;

    // Table boxes, in document order. Duplicate display names are preserved
    // here (cells have distinct ids); the import service rejects them.
    let mut table_order: Vec<String> = Vec::new();
    let mut table_names: HashMap<String, String> = HashMap::new();
    for cell in &cells {
        if cell.vertex && cell.id.starts_with(TABLE_ID_PREFIX) {
            let name = table_display_name(&cell.value);
            if name.is_empty() {
                continue;
            }
            table_order.push(cell.id.clone());
            table_names.insert(cell.id.clone(), name);
        }
    }

    // Field rows attached to a recognized table. The index keeps every
    // field's owning table and column name for edge resolution below.
    let mut fields_by_table: HashMap<String, Vec<ParsedField>> = HashMap::new();
    let mut field_index: HashMap<String, (String, String)> = HashMap::new();
    for cell in &cells {
        if !cell.vertex || !cell.id.starts_with(FIELD_ID_PREFIX) {
            continue;
        }
        let Some(table_name) = table_names.get(&cell.parent) else {
            continue;
        };
        let Some(field) = parse_field_label(&cell.value) else {
            continue;
        };
        field_index.insert(cell.id.clone(), (table_name.clone(), field.name.clone()));
        fields_by_table
            .entry(cell.parent.clone())
            .or_default()
            .push(field);
    }

    let mut tables = Vec::with_capacity(table_order.len());
    for table_id in &table_order {
        let fields = fields_by_table.remove(table_id).unwrap_or_default();
        tables.push(DiagramTable {
            name: table_names[table_id].clone(),
            columns: merge_columns(&fields),
        });
    }

    // Edges become relations when both endpoints resolve to known fields.
    let mut relations = Vec::new();
    let mut seen: HashSet<(String, String, String, String, RelationType)> = HashSet::new();
    for cell in &cells {
        if !cell.edge {
            continue;
        }
        let endpoints = cell.source.as_deref().zip(cell.target.as_deref());
        let Some((source, target)) = endpoints else {
            continue;
        };
        let (Some((from_table, from_column)), Some((to_table, to_column))) =
            (field_index.get(source), field_index.get(target))
        else {
            debug!(
                "[DiagramParser] Dropping edge {} with unresolved endpoint",
                cell.id
            );
            continue;
        };
        let relation_type = resolve_relation_type(&cell.value, &cell.style);
        let key = (
            from_table.clone(),
            from_column.clone(),
            to_table.clone(),
            to_column.clone(),
            relation_type,
        );
        if !seen.insert(key) {
            continue;
        }
        relations.push(DiagramRelation {
            from_table: from_table.clone(),
            from_column: from_column.clone(),
            to_table: to_table.clone(),
            to_column: to_column.clone(),
            relation_type,
        });
    }

    info!(
        "[DiagramParser] Parsed {} tables and {} relations from {} cells",
        tables.len(),
        relations.len(),
        cells.len()
    );

    Ok(ImportPayload { tables, relations })
}

/// Pull every mxCell's attributes out of the markup.
fn collect_cells(raw_markup: &str) -> Result<Vec<RawCell>, ParseError> {
    let mut reader = Reader::from_str(raw_markup);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut cells = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            // draw.io writes leaf cells as self-closing elements
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"mxCell" {
                    let mut cell = RawCell::default();
                    for attr in e.attributes().flatten() {
                        let value = match attr.unescape_value() {
                            Ok(v) => v.into_owned(),
                            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                        };
                        match attr.key.as_ref() {
                            b"id" => cell.id = value,
                            b"value" => cell.value = value,
                            b"style" => cell.style = value,
                            b"parent" => cell.parent = value,
                            b"source" => cell.source = Some(value),
                            b"target" => cell.target = Some(value),
                            b"vertex" => cell.vertex = value == "1",
                            b"edge" => cell.edge = value == "1",
                            _ => {}
                        }
                    }
                    cells.push(cell);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::InvalidMarkup(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(cells)
}

/// Strip HTML tags from a cell label and collapse the remaining whitespace.
fn strip_tags(value: &str) -> String {
    let spaced = value.replace("&nbsp;", " ");
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    let without_tags = tag_re.replace_all(&spaced, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Table display name: tags stripped, trailing parenthetical (usually a
/// schema annotation) removed.
fn table_display_name(value: &str) -> String {
    let text = strip_tags(value);
    let paren_re = Regex::new(r"\s*\([^()]*\)\s*$").unwrap();
    paren_re.replace(&text, "").trim().to_string()
}

/// Split a field label into name, optional type and marker flags.
///
/// Markers are detected on the full label first; the arrow cut happens
/// before the colon split, so a label like `customer_id → Customers.id`
/// keeps only `customer_id` as the name.
fn parse_field_label(value: &str) -> Option<ParsedField> {
    let text = strip_tags(value);
    if text.is_empty() {
        return None;
    }

    let pk_marker = Regex::new(r"(?i)\(\s*pk\s*\)").unwrap();
    let is_primary_key = text.contains(PK_GLYPH) || pk_marker.is_match(&text);
    let relation_label = text.contains(LINK_GLYPH) || text.contains(ARROW_GLYPH);

    let head = match text.find(ARROW_GLYPH) {
        Some(idx) => &text[..idx],
        None => text.as_str(),
    };
    let cleaned: String = pk_marker
        .replace_all(head, "")
        .chars()
        .filter(|c| *c != PK_GLYPH && *c != LINK_GLYPH)
        .collect();

    let (name, field_type) = match cleaned.find(':') {
        Some(idx) => (
            cleaned[..idx].trim().to_string(),
            Some(cleaned[idx + 1..].trim().to_string()).filter(|t| !t.is_empty()),
        ),
        None => (cleaned.trim().to_string(), None),
    };

    if name.is_empty() {
        return None;
    }
    Some(ParsedField {
        name,
        field_type,
        is_primary_key,
        relation_label,
    })
}

/// Merge a table's fields into its column list.
///
/// Plain fields are merged first, then relation-label fields, so a field
/// that only annotates an edge never displaces a declared column. Merging
/// by name fills in a missing type and latches the primary-key flag; it
/// never downgrades either.
fn merge_columns(fields: &[ParsedField]) -> Vec<DiagramColumn> {
    let mut columns: Vec<DiagramColumn> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for field in fields.iter().filter(|f| !f.relation_label) {
        merge_field(&mut columns, &mut by_name, field);
    }
    for field in fields.iter().filter(|f| f.relation_label) {
        merge_field(&mut columns, &mut by_name, field);
    }
    columns
}

fn merge_field(
    columns: &mut Vec<DiagramColumn>,
    by_name: &mut HashMap<String, usize>,
    field: &ParsedField,
) {
    match by_name.get(&field.name) {
        Some(&idx) => {
            let existing = &mut columns[idx];
            if type_is_unknown(&existing.column_type) && !type_is_unknown(&field.field_type) {
                existing.column_type = field.field_type.clone();
            }
            if field.is_primary_key {
                existing.is_primary_key = true;
            }
        }
        None => {
            by_name.insert(field.name.clone(), columns.len());
            columns.push(DiagramColumn {
                name: field.name.clone(),
                column_type: field.field_type.clone(),
                is_primary_key: field.is_primary_key,
            });
        }
    }
}

fn type_is_unknown(column_type: &Option<String>) -> bool {
    match column_type {
        None => true,
        Some(t) => t.trim().is_empty() || t.eq_ignore_ascii_case("unknown"),
    }
}

/// Resolve an edge's relation type.
///
/// An explicit cardinality label always wins, with no attempt to reconcile
/// it against the arrow styling. Without a label the arrow-head styles are
/// consulted, and failing that the type defaults to many-to-one.
fn resolve_relation_type(label: &str, style: &str) -> RelationType {
    let normalized: String = strip_tags(label)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    match normalized.to_uppercase().as_str() {
        "1:1" => return RelationType::OneToOne,
        "1:N" | "1:M" => return RelationType::OneToMany,
        "N:1" | "M:1" => return RelationType::ManyToOne,
        _ => {}
    }

    match (arrow_hint(style, "startArrow"), arrow_hint(style, "endArrow")) {
        (Some(ArrowHint::One), Some(ArrowHint::One)) => RelationType::OneToOne,
        (Some(ArrowHint::One), Some(ArrowHint::Many)) => RelationType::OneToMany,
        (Some(ArrowHint::Many), Some(ArrowHint::One)) => RelationType::ManyToOne,
        _ => RelationType::ManyToOne,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrowHint {
    One,
    Many,
}

/// Read one arrow-head hint out of a draw.io style string such as
/// `edgeStyle=entityRelationEdgeStyle;startArrow=ERmany;endArrow=ERone;`.
fn arrow_hint(style: &str, key: &str) -> Option<ArrowHint> {
    let value = style.split(';').find_map(|part| {
        let (k, v) = part.split_once('=')?;
        (k.trim() == key).then(|| v.trim().to_lowercase())
    })?;
    if value.contains("many") {
        Some(ArrowHint::Many)
    } else if value.contains("one") {
        Some(ArrowHint::One)
    } else {
        None
    }
}
