//! Field extraction for each SAMI dialect.
//!
//! Every extractor takes one chunk and returns a [`SamiRecord`]. Problems in
//! the chunk never abort extraction; they are recorded as
//! [`ExtractionIssue`]s and whatever fields could be read are kept.
//!
//! Tag content in the text, PRN and authority dialects uses `|` as the
//! subfield delimiter: `|aTitle|cAuthor`. Control tags keep only the text
//! after `|a`.

use crate::marcxml::unescape_entities;
use crate::record::{is_control_tag, normalize_tag, Field, Subfield};
use crate::sami::dialect::DOCUMENT_BOUNDARY;
use crate::sami::record::{element_text, elements, AuthorityHeader, ExtractionIssue, SamiRecord};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use regex::Regex;
use smallvec::SmallVec;

lazy_static! {
    /// Continuation lines of authority records: a line break and four or more spaces.
    static ref CONTINUATION: Regex = Regex::new(r"\n[ ]{4,}").unwrap();
    /// Field marker inside a line: `tag:` and the spaces before its first `|`.
    static ref AUTHORITY_FIELD: Regex = Regex::new(r"[^\n][ ]+([^\s]{3}):[ ]+\|").unwrap();
    static ref MARC_ENTRY: Regex = Regex::new(
        r#"<marcEntry tag="(.*?)"(?: label="(.*?)")? ind="(.*?)">(.*?)</marcEntry>"#
    )
    .unwrap();
}

const HEADER_ATTRIBUTES: usize = 9;
const NEVER: &str = "NEVER";
const NO_CALL_NUMBER: &str = "[NO CALL NUMBER]";

/// Build a field from pipe-delimited content.
fn pipe_field(tag: &str, indicators: (char, char), content: &str) -> Field {
    let tag = normalize_tag(tag);
    if is_control_tag(&tag) {
        return Field::control_unchecked(tag, control_value(content).to_string());
    }
    let subfields = flatten(content.split('|').skip(1));
    Field::data_unchecked(tag, indicators.0, indicators.1, subfields)
}

fn control_value(content: &str) -> &str {
    content
        .split_once("|a")
        .map_or(content, |(_, value)| value)
        .trim()
}

/// Turn `|`-separated pieces into subfields; empty pieces are dropped.
fn flatten<'a>(pieces: impl Iterator<Item = &'a str>) -> SmallVec<[Subfield; 4]> {
    pieces
        .filter_map(|piece| {
            let mut chars = piece.chars();
            let code = chars.next()?;
            Some(Subfield::new(code, chars.as_str()))
        })
        .collect()
}

/// A data field with blank indicators.
fn blank_field<const N: usize>(tag: &str, subfields: [(char, String); N]) -> Field {
    let subfields = subfields
        .into_iter()
        .map(|(code, value)| Subfield::new(code, value))
        .collect();
    Field::data_unchecked(normalize_tag(tag), ' ', ' ', subfields)
}

/// Extract a delimited-authority record.
///
/// The first line holds nine `\t\t`-separated header attributes, which become
/// fields 901-909. Field lines look like `   100:   |aSmith, John|d1900-`.
#[must_use]
pub fn authority(chunk: String, tidy: bool) -> SamiRecord {
    let mut sami = SamiRecord::new(chunk);
    let raw = sami.raw().to_string();

    let mut header = parse_header(&mut sami, &raw);
    if tidy {
        header.created = tidy_date(&mut sami, "created", header.created);
        header.modified = tidy_date(&mut sami, "modified", header.modified);
    }

    let record = &mut sami.record;
    let h = &header;
    record.add_ordered_field(blank_field("901", [('a', format!("id: {}", h.source_id))]));
    record.add_ordered_field(blank_field("902", [('a', format!("fmt: {}", h.format))]));
    record.add_ordered_field(blank_field("903", [('a', format!("level: {}", h.level))]));
    if tidy {
        record.add_ordered_field(blank_field(
            "904",
            [
                ('a', format!("created: {}", h.created)),
                ('b', format!("created_by: {}", h.created_by)),
            ],
        ));
        record.add_ordered_field(blank_field(
            "906",
            [
                ('a', format!("modified: {}", h.modified)),
                ('b', format!("modified_by: {}", h.modified_by)),
            ],
        ));
    } else {
        record.add_ordered_field(blank_field("904", [('a', format!("created: {}", h.created))]));
        record.add_ordered_field(blank_field("905", [('a', format!("created_by: {}", h.created_by))]));
        record.add_ordered_field(blank_field("906", [('a', format!("modified: {}", h.modified))]));
        record.add_ordered_field(blank_field("907", [('a', format!("modified_by: {}", h.modified_by))]));
    }
    record.add_ordered_field(blank_field("908", [('a', format!("cataloged: {}", h.cataloged))]));
    record.add_ordered_field(blank_field("909", [('a', format!("source: {}", h.source))]));

    let folded = CONTINUATION.replace_all(&raw, " ");
    for (tag, content) in authority_field_lines(&folded) {
        record.add_ordered_field(authority_field(tag, content));
    }

    if tidy && !sami.record.contains_tag("001") {
        let id = header.source_id.trim();
        if id.is_empty() {
            sami.add_issue(ExtractionIssue::MissingIdentifier);
        } else {
            sami.record
                .add_ordered_field(Field::control_unchecked("001".to_string(), id.to_string()));
        }
    }

    sami.authority = Some(header);
    sami
}

fn parse_header(sami: &mut SamiRecord, raw: &str) -> AuthorityHeader {
    let first_line = raw.split('\n').next().unwrap_or_default();
    let attributes: Vec<&str> = first_line.trim_end_matches('\t').split("\t\t").collect();
    if attributes.len() < HEADER_ATTRIBUTES {
        sami.add_issue(ExtractionIssue::MissingHeaderAttributes {
            found: attributes.len(),
        });
    }

    let get = |i: usize| attributes.get(i).copied().unwrap_or_default().to_string();
    AuthorityHeader {
        source_id: get(0),
        format: get(1),
        level: get(2),
        created: get(3),
        created_by: get(4),
        modified: get(5),
        modified_by: get(6),
        cataloged: get(7),
        source: get(8),
    }
}

/// Rewrite `dd/mm/YYYY` as `YYYYmmdd`; `NEVER` and unparseable values are kept.
fn tidy_date(sami: &mut SamiRecord, attribute: &'static str, value: String) -> String {
    if value == NEVER {
        return value;
    }
    match NaiveDate::parse_from_str(&value, "%d/%m/%Y") {
        Ok(date) => date.format("%Y%m%d").to_string(),
        Err(_) => {
            sami.add_issue(ExtractionIssue::InvalidDate { attribute, value: value.clone() });
            value
        },
    }
}

/// Split folded authority text into `(tag, content)` pairs.
///
/// Content starts at the marker's `|` and runs up to the next marker or the
/// end of the line, whichever comes first.
fn authority_field_lines(folded: &str) -> Vec<(&str, &str)> {
    let markers: Vec<(&str, usize, usize)> = AUTHORITY_FIELD
        .captures_iter(folded)
        .filter_map(|caps| {
            let marker = caps.get(0)?;
            // The marker's first character still belongs to the previous field.
            let previous_end = marker.start() + folded[marker.start()..].chars().next()?.len_utf8();
            Some((caps.get(1)?.as_str(), marker.end() - 1, previous_end))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, &(tag, start, _))| {
            let end = markers.get(i + 1).map_or(folded.len(), |next| next.2);
            let content = &folded[start..end];
            let content = content.split('\n').next().unwrap_or(content);
            (tag, content.trim_end())
        })
        .collect()
}

fn authority_field(tag: &str, content: &str) -> Field {
    let tag = normalize_tag(tag);
    if is_control_tag(&tag) {
        return pipe_field(&tag, (' ', ' '), content);
    }

    let groups: Vec<&str> = content.split('|').skip(1).collect();
    match groups.split_first() {
        Some((first, rest)) if !rest.is_empty() && is_indicator_pair(first) => {
            let mut chars = first.chars().map(|c| if c == '#' { ' ' } else { c });
            let indicator1 = chars.next().unwrap_or(' ');
            let indicator2 = chars.next().unwrap_or(' ');
            Field::data_unchecked(tag, indicator1, indicator2, flatten(rest.iter().copied()))
        },
        _ => Field::data_unchecked(tag, ' ', ' ', flatten(groups.iter().copied())),
    }
}

fn is_indicator_pair(group: &str) -> bool {
    group.chars().count() == 2
        && group
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '#')
}

/// Extract a plain tagged text record.
///
/// Lines look like `.245. 10|aTitle|cAuthor`: the tag sits in columns 2-4 and
/// the indicators in columns 7-8. A `FORM=` line becomes an `FMT` field.
#[must_use]
pub fn text(chunk: String) -> SamiRecord {
    let mut sami = SamiRecord::new(chunk);
    let mut fields = Vec::new();

    for line in sami.raw().split('\n') {
        if line.is_empty() || line.contains(DOCUMENT_BOUNDARY) {
            continue;
        }
        if line.contains("FORM=") {
            let form = line.split_once('=').map_or("", |(_, v)| v).trim();
            fields.push(blank_field("FMT", [('a', form.to_string())]));
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let tag: String = chars.iter().skip(1).take(3).collect();
        let indicator1 = chars.get(6).copied().unwrap_or(' ');
        let indicator2 = chars.get(7).copied().unwrap_or(' ');
        let content = if is_control_tag(&normalize_tag(&tag)) && !line.contains("|a") {
            // No |a: everything after the tag column is the value.
            line.char_indices().nth(5).map_or("", |(i, _)| &line[i..])
        } else {
            line
        };
        fields.push(pipe_field(&tag, (indicator1, indicator2), content));
    }

    for field in fields {
        sami.record.add_ordered_field(field);
    }
    sami
}

/// Where a `999` holdings subfield takes its value from.
#[derive(Clone, Copy)]
enum ItemValue {
    /// Text of an item element, trimmed.
    Element(&'static str),
    /// The enclosing call's library, untrimmed.
    Library,
    /// Always `Y`.
    Flag,
}

/// Subfields of each `999` holdings field after `a` and `w`, in output order.
const ITEM_SUBFIELDS: [(char, ItemValue); 12] = [
    ('c', ItemValue::Element("copyNumber")),
    ('i', ItemValue::Element("itemID")),
    ('d', ItemValue::Element("dateCreated")),
    ('k', ItemValue::Element("location")),
    ('l', ItemValue::Element("homeLocation")),
    ('m', ItemValue::Library),
    ('r', ItemValue::Flag),
    ('s', ItemValue::Flag),
    ('t', ItemValue::Element("type")),
    ('u', ItemValue::Element("dateModified")),
    ('x', ItemValue::Element("category1")),
    ('z', ItemValue::Element("category2")),
];

/// Extract a legacy report (PRN) record.
///
/// Bibliographic fields come from `marcEntry` elements; every `item` under a
/// `call` becomes a `999` holdings field.
#[must_use]
pub fn prn(chunk: String) -> SamiRecord {
    let mut sami = SamiRecord::new(chunk);
    let mut fields = Vec::new();

    for line in sami.raw().split('\n') {
        for caps in MARC_ENTRY.captures_iter(line) {
            let mut ind = caps[3].chars();
            let indicators = (ind.next().unwrap_or(' '), ind.next().unwrap_or(' '));
            fields.push(pipe_field(&caps[1], indicators, &caps[4]));
        }
    }

    let joined = sami.raw().replace('\n', "");
    for call in elements(&joined, "call") {
        let call_number = element_text(call, "callNumber").unwrap_or(NO_CALL_NUMBER);
        let library = element_text(call, "library");
        for item in elements(call, "item") {
            fields.push(holdings_field(call_number, library, item));
        }
    }

    for field in fields {
        sami.record.add_ordered_field(field);
    }
    sami
}

fn holdings_field(call_number: &str, library: Option<&str>, item: &str) -> Field {
    let mut subfields: SmallVec<[Subfield; 4]> = SmallVec::new();
    subfields.push(Subfield::new('a', call_number));
    subfields.push(Subfield::new('w', "ALPHANUM"));

    for (code, source) in ITEM_SUBFIELDS {
        let value = match source {
            ItemValue::Library => library,
            ItemValue::Flag => Some("Y"),
            // Items never modified fall back to their creation date
            ItemValue::Element("dateModified") => element_text(item, "dateModified")
                .or_else(|| element_text(item, "dateCreated"))
                .map(str::trim),
            ItemValue::Element(element) => element_text(item, element).map(str::trim),
        };
        if let Some(value) = value {
            subfields.push(Subfield::new(code, value));
        }
    }

    Field::data_unchecked("999".to_string(), ' ', ' ', subfields)
}

/// A field being read from XML, before it is classified.
#[derive(Default)]
struct XmlField {
    tag: String,
    indicator1: char,
    indicator2: char,
    value: String,
    subfields: SmallVec<[Subfield; 4]>,
}

/// Extract an XML-tagged record.
///
/// `controlfield`, `datafield` and `subfield` elements are read with or
/// without a namespace prefix. All control fields are placed before the
/// data fields are merged in.
#[must_use]
pub fn xml(chunk: String) -> SamiRecord {
    let mut sami = SamiRecord::new(chunk);
    let (control, data, error) = scan_xml(sami.raw());
    if let Some(message) = error {
        sami.add_issue(ExtractionIssue::MalformedXml(message));
    }

    for f in control {
        let tag = normalize_tag(&f.tag);
        let field = if is_control_tag(&tag) {
            Field::control_unchecked(tag, f.value)
        } else {
            Field::data_unchecked(tag, ' ', ' ', SmallVec::new())
        };
        sami.record.add_ordered_field(field);
    }
    for f in data {
        let tag = normalize_tag(&f.tag);
        let field = if is_control_tag(&tag) {
            let value = f.subfields.iter().map(|s| s.value.as_str()).collect::<String>();
            Field::control_unchecked(tag, value)
        } else {
            Field::data_unchecked(tag, f.indicator1, f.indicator2, f.subfields)
        };
        sami.record.add_ordered_field(field);
    }
    sami
}

fn scan_xml(chunk: &str) -> (Vec<XmlField>, Vec<XmlField>, Option<String>) {
    let mut reader = Reader::from_str(chunk);
    reader.check_end_names(false);

    let mut control = Vec::new();
    let mut data = Vec::new();
    let mut current_control: Option<XmlField> = None;
    let mut current_data: Option<XmlField> = None;
    let mut current_subfield: Option<Subfield> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return (
                    control,
                    data,
                    Some(format!("at byte {}: {e}", reader.buffer_position())),
                )
            },
        };
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"controlfield" => current_control = Some(xml_field(&e)),
                b"datafield" => current_data = Some(xml_field(&e)),
                b"subfield" if current_data.is_some() => {
                    current_subfield = subfield_start(&e);
                },
                _ => {},
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"controlfield" => control.push(xml_field(&e)),
                b"datafield" => data.push(xml_field(&e)),
                b"subfield" => {
                    if let (Some(field), Some(subfield)) = (current_data.as_mut(), subfield_start(&e)) {
                        field.subfields.push(subfield);
                    }
                },
                _ => {},
            },
            Event::Text(t) => {
                let text = text_value(&t);
                if let Some(subfield) = current_subfield.as_mut() {
                    subfield.value.push_str(&text);
                } else if let Some(field) = current_control.as_mut() {
                    field.value.push_str(&text);
                }
            },
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t);
                if let Some(subfield) = current_subfield.as_mut() {
                    subfield.value.push_str(&text);
                } else if let Some(field) = current_control.as_mut() {
                    field.value.push_str(&text);
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"controlfield" => control.extend(current_control.take()),
                b"datafield" => data.extend(current_data.take()),
                b"subfield" => {
                    if let (Some(field), Some(subfield)) = (current_data.as_mut(), current_subfield.take()) {
                        field.subfields.push(subfield);
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }

    (control, data, None)
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    let attr = e.try_get_attribute(name).ok().flatten()?;
    let raw = String::from_utf8_lossy(&attr.value);
    Some(unescape_entities(&raw).into_owned())
}

fn xml_field(e: &BytesStart<'_>) -> XmlField {
    let indicator = |name| {
        attribute(e, name)
            .and_then(|v| v.chars().next())
            .unwrap_or(' ')
    };
    XmlField {
        tag: attribute(e, "tag").unwrap_or_default(),
        indicator1: indicator("ind1"),
        indicator2: indicator("ind2"),
        ..XmlField::default()
    }
}

fn subfield_start(e: &BytesStart<'_>) -> Option<Subfield> {
    let code = attribute(e, "code")?.chars().next()?;
    Some(Subfield::new(code, String::new()))
}

/// Element text with known entities resolved; unknown ones stay as written.
fn text_value(t: &BytesText<'_>) -> String {
    let raw = String::from_utf8_lossy(t);
    unescape_entities(&raw).into_owned()
}
