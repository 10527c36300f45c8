// src/export/template.rs
//
// Filling a pre-styled .xlsx template. The workbook is edited at the XML
// level so that every part we do not touch (styles, column widths, shared
// strings, drawings) is copied byte for byte.

use crate::errors::{AppError, AppResult};
use crate::export::model::Cell;
use crate::export::xlsx::to_export_error;
use regex::Regex;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Header labels of the monthly report, in column order.
pub const REPORT_HEADERS: [&str; 13] = [
    "📅 Fecha",
    "🛠️ Equipo",
    "⛽ Volumen Despachado (gal)",
    "👤 Responsable",
    "🧪 Litros Despachados",
    "🕒 Horas Trabajadas",
    "⏱️ Horómetro Inicial",
    "⏱️ Horómetro Final",
    "📟 Contador Inicial",
    "📟 Contador Final",
    "🔁 Consumo (gal/h)",
    "💲 Precio Diesel",
    "💰 Costo Diesel (USD)",
];

type Archive = ZipArchive<Cursor<Vec<u8>>>;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";

fn re(pattern: &str) -> AppResult<Regex> {
    Regex::new(pattern).map_err(|e| AppError::Other(e.to_string()))
}

/// Column letters for a zero-based index (`0 → A`, `27 → AB`).
pub fn column_letter(mut idx: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn attr(re_attr: &Regex, tag: &str) -> Option<String> {
    re_attr.captures(tag).map(|c| c[1].to_string())
}

fn read_entry(archive: &mut Archive, name: &str) -> AppResult<String> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| AppError::Export(format!("template part '{}': {}", name, e)))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Zip entry name of the worksheet called `sheet`.
fn locate_sheet(archive: &mut Archive, sheet: &str) -> AppResult<String> {
    let workbook = read_entry(archive, "xl/workbook.xml")?;

    let sheet_tag = re(r"<sheet\b[^>]*>")?;
    let name_attr = re(r#"\bname="([^"]*)""#)?;
    let rid_attr = re(r#"\br:id="([^"]*)""#)?;

    let rid = sheet_tag
        .find_iter(&workbook)
        .map(|m| m.as_str())
        .find(|tag| attr(&name_attr, tag).is_some_and(|n| xml_unescape(&n) == sheet))
        .and_then(|tag| attr(&rid_attr, tag))
        .ok_or_else(|| AppError::MissingSheet(sheet.to_string()))?;

    let rels = read_entry(archive, WORKBOOK_RELS)?;
    let rel_tag = re(r"<Relationship\b[^>]*>")?;
    let id_attr = re(r#"\bId="([^"]*)""#)?;
    let target_attr = re(r#"\bTarget="([^"]*)""#)?;

    let target = rel_tag
        .find_iter(&rels)
        .map(|m| m.as_str())
        .find(|tag| attr(&id_attr, tag).as_deref() == Some(rid.as_str()))
        .and_then(|tag| attr(&target_attr, tag))
        .ok_or_else(|| AppError::MissingSheet(sheet.to_string()))?;

    Ok(match target.strip_prefix('/') {
        Some(abs) => abs.to_string(),
        None => format!("xl/{}", target),
    })
}

/// `p` is the namespace prefix of the worksheet elements, `""` or e.g. `"x:"`.
fn cell_xml(p: &str, reference: &str, style: Option<&str>, cell: &Cell) -> String {
    let s = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    match cell {
        Cell::Text(t) => format!(
            r#"<{p}c r="{reference}"{s} t="inlineStr"><{p}is><{p}t xml:space="preserve">{}</{p}t></{p}is></{p}c>"#,
            xml_escape(t)
        ),
        Cell::Number(n) if n.is_finite() => {
            format!(r#"<{p}c r="{reference}"{s}><{p}v>{}</{p}v></{p}c>"#, n)
        }
        _ => format!(r#"<{p}c r="{reference}"{s}/>"#),
    }
}

/// Replace the data rows of a worksheet. Row 1 is kept as is; row 2
/// provides the per-column styles of the written rows. Elements may carry
/// a namespace prefix (`<x:sheetData>`); written elements reuse it.
pub fn fill_sheet_xml(sheet_xml: &str, rows: &[Vec<Cell>], width: usize) -> AppResult<String> {
    let sheet_data =
        re(r"(?s)<(\w+:)?sheetData\b([^>]*?)(?:/>|>(.*?)</(?:\w+:)?sheetData>)")?;
    let row_re = re(r"(?s)<(?:\w+:)?row\b([^>]*?)(?:/>|>(.*?)</(?:\w+:)?row>)")?;
    let cell_re = re(r"(?s)<(?:\w+:)?c\b([^>]*?)(?:/>|>.*?</(?:\w+:)?c>)")?;
    let r_attr = re(r#"\br="([A-Z]*)(\d+)""#)?;
    let s_attr = re(r#"\bs="(\d+)""#)?;
    let drop_attr = re(r#"\s(?:r|spans)="[^"]*""#)?;

    let caps = sheet_data
        .captures(sheet_xml)
        .ok_or_else(|| AppError::Export("worksheet has no sheetData".into()))?;
    let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let p = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let open_attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let inner = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    // 1️⃣ header row and sample row
    let mut header = String::new();
    let mut sample_attrs = String::new();
    let mut styles: HashMap<String, String> = HashMap::new();

    for (pos, row) in row_re.captures_iter(inner).enumerate() {
        let attrs = row.get(1).map(|m| m.as_str()).unwrap_or("");
        let number = r_attr
            .captures(attrs)
            .and_then(|c| c[2].parse::<u32>().ok())
            .unwrap_or(pos as u32 + 1);

        match number {
            1 => header = row[0].to_string(),
            2 => {
                sample_attrs = drop_attr.replace_all(attrs, "").into_owned();
                let body = row.get(2).map(|m| m.as_str()).unwrap_or("");
                for (col_pos, c) in cell_re.captures_iter(body).enumerate() {
                    let cattrs = &c[1];
                    let col = r_attr
                        .captures(cattrs)
                        .map(|rc| rc[1].to_string())
                        .filter(|l| !l.is_empty())
                        .unwrap_or_else(|| column_letter(col_pos));
                    if let Some(s) = attr(&s_attr, cattrs) {
                        styles.insert(col, s);
                    }
                }
            }
            _ => {}
        }
    }

    // 2️⃣ new rows from row 2 on
    let mut data = String::with_capacity(inner.len() + rows.len() * 512);
    data.push_str(&header);

    for (i, cells) in rows.iter().enumerate() {
        let r = i + 2;
        data.push_str(&format!(r#"<{p}row r="{}"{}>"#, r, sample_attrs.trim_end_matches('/')));
        for (c, cell) in cells.iter().enumerate() {
            let col = column_letter(c);
            let reference = format!("{}{}", col, r);
            data.push_str(&cell_xml(p, &reference, styles.get(&col).map(|s| s.as_str()), cell));
        }
        data.push_str(&format!("</{p}row>"));
    }

    let mut out = String::with_capacity(sheet_xml.len() + data.len());
    out.push_str(&sheet_xml[..whole.start]);
    out.push_str(&format!("<{p}sheetData{}>{}</{p}sheetData>", open_attrs, data));
    out.push_str(&sheet_xml[whole.end..]);

    // 3️⃣ used range
    let last_row = rows.len() + 1;
    let dimension = re(r#"<(\w+:)?dimension\b[^>]*/>"#)?;
    let last_col = column_letter(width.saturating_sub(1));
    Ok(dimension
        .replace(&out, |c: &regex::Captures| {
            let dp = c.get(1).map(|m| m.as_str()).unwrap_or("");
            format!(r#"<{dp}dimension ref="A1:{last_col}{last_row}"/>"#)
        })
        .into_owned())
}

const CALC_CHAIN: &str = "xl/calcChain.xml";

/// Remove every tag matched by `pattern` from a package part.
fn strip_tags(xml: &str, pattern: &str) -> AppResult<String> {
    Ok(re(pattern)?.replace_all(xml, "").into_owned())
}

/// Open `template`, write `rows` into `sheet` and return the new workbook bytes.
/// Nothing is written to disk here.
pub fn render_template(
    template: &Path,
    sheet: &str,
    rows: &[Vec<Cell>],
    width: usize,
) -> AppResult<Vec<u8>> {
    if !template.is_file() {
        return Err(AppError::MissingTemplate(template.display().to_string()));
    }

    let bytes = fs::read(template)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        AppError::Export(format!("{} is not a valid .xlsx file: {}", template.display(), e))
    })?;

    let sheet_path = locate_sheet(&mut archive, sheet)?;
    let sheet_xml = read_entry(&mut archive, &sheet_path)?;
    let filled = fill_sheet_xml(&sheet_xml, rows, width)?;

    // the calc chain lists formula cells of the old rows; Excel rebuilds it
    let mut rewritten: HashMap<String, String> = HashMap::new();
    rewritten.insert(sheet_path.clone(), filled);
    let has_calc_chain = archive.file_names().any(|n| n == CALC_CHAIN);
    if has_calc_chain {
        let types = read_entry(&mut archive, CONTENT_TYPES)?;
        rewritten.insert(
            CONTENT_TYPES.to_string(),
            strip_tags(&types, r#"<Override\b[^>]*PartName="/xl/calcChain\.xml"[^>]*/>"#)?,
        );
        let rels = read_entry(&mut archive, WORKBOOK_RELS)?;
        rewritten.insert(
            WORKBOOK_RELS.to_string(),
            strip_tags(&rels, r#"<Relationship\b[^>]*Target="[^"]*calcChain\.xml"[^>]*/>"#)?,
        );
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(to_export_error)?;
        let name = entry.name().to_string();
        if name == CALC_CHAIN {
            continue;
        }
        match rewritten.get(&name) {
            Some(content) => {
                drop(entry);
                writer.start_file(name, options).map_err(to_export_error)?;
                writer.write_all(content.as_bytes())?;
            }
            None => writer.raw_copy_file(entry).map_err(to_export_error)?,
        }
    }

    let cursor = writer.finish().map_err(to_export_error)?;
    Ok(cursor.into_inner())
}

/// Write a default report template: the recognized sheet, the header row,
/// one styled sample row and column widths.
pub fn write_default_template(path: &Path, sheet: &str) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(to_export_error)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x1F4E78))
        .set_pattern(FormatPattern::Solid)
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let text_format = Format::new().set_border(FormatBorder::Thin);
    let number_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Right)
        .set_num_format("#,##0.00");

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_with_format(0, col, *header, &header_format)
            .map_err(to_export_error)?;

        // date, equipment and operator are text; everything else numeric
        let sample = if matches!(col, 0 | 1 | 3) {
            &text_format
        } else {
            &number_format
        };
        worksheet
            .write_blank(1, col, sample)
            .map_err(to_export_error)?;

        let width = if matches!(col, 1 | 2) { 26.0 } else { 18.0 };
        worksheet
            .set_column_width(col, width)
            .map_err(to_export_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_export_error)?;
    workbook.save(path).map_err(to_export_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(12), "M");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn fill_keeps_header_and_sample_styles() {
        let xml = concat!(
            r#"<worksheet><dimension ref="A1:B3"/><sheetData>"#,
            r#"<row r="1" spans="1:2"><c r="A1" s="1" t="s"><v>0</v></c><c r="B1" s="1" t="s"><v>1</v></c></row>"#,
            r#"<row r="2" spans="1:2" ht="18" customHeight="1"><c r="A2" s="4"/><c r="B2" s="7"/></row>"#,
            r#"<row r="3"><c r="A3"><v>9</v></c></row>"#,
            r#"</sheetData><cols/></worksheet>"#
        );

        let rows = vec![
            vec![Cell::text("A & B"), Cell::Number(26.42)],
            vec![Cell::Empty, Cell::Number(1.0)],
        ];
        let out = fill_sheet_xml(xml, &rows, 2).unwrap();

        assert!(out.contains(r#"<c r="A1" s="1" t="s"><v>0</v></c>"#));
        assert!(out.contains(r#"<c r="A2" s="4" t="inlineStr"><is><t xml:space="preserve">A &amp; B</t></is></c>"#));
        assert!(out.contains(r#"<c r="B2" s="7"><v>26.42</v></c>"#));
        assert!(out.contains(r#"<c r="A3" s="4"/>"#));
        assert!(out.contains(r#"ht="18""#));
        assert!(!out.contains("<v>9</v>"));
        assert!(out.contains(r#"<dimension ref="A1:B3"/>"#));
        assert!(out.ends_with("<cols/></worksheet>"));
    }

    #[test]
    fn fill_keeps_the_namespace_prefix() {
        let xml = concat!(
            r#"<x:worksheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            r#"<x:dimension ref="A1:B2"/><x:sheetData>"#,
            r#"<x:row r="1"><x:c r="A1" s="1" t="s"><x:v>0</x:v></x:c></x:row>"#,
            r#"<x:row r="2"><x:c r="A2" s="4"/><x:c r="B2" s="7"/></x:row>"#,
            r#"</x:sheetData></x:worksheet>"#
        );

        let rows = vec![vec![Cell::text("PALA"), Cell::Number(10.5)]];
        let out = fill_sheet_xml(xml, &rows, 2).unwrap();

        assert!(out.contains(r#"<x:row r="1"><x:c r="A1" s="1" t="s"><x:v>0</x:v></x:c></x:row>"#));
        assert!(out.contains(r#"<x:c r="A2" s="4" t="inlineStr"><x:is><x:t xml:space="preserve">PALA</x:t></x:is></x:c>"#));
        assert!(out.contains(r#"<x:c r="B2" s="7"><x:v>10.5</x:v></x:c>"#));
        assert!(out.contains(r#"<x:dimension ref="A1:B2"/>"#));
        assert!(out.contains("</x:row></x:sheetData></x:worksheet>"));
        assert!(!out.contains("<row"));
        assert!(!out.contains("<sheetData"));
    }

    #[test]
    fn empty_self_closing_sheet_data_is_filled() {
        let xml = r#"<worksheet><dimension ref="A1"/><sheetData/></worksheet>"#;
        let out = fill_sheet_xml(xml, &[vec![Cell::Number(1.0)]], 1).unwrap();

        assert!(out.contains(r#"<sheetData><row r="2"><c r="A2"><v>1</v></c></row></sheetData>"#));
        assert!(out.contains(r#"<dimension ref="A1:A2"/>"#));
    }

    fn zip_of(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut w = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            w.start_file(*name, SimpleFileOptions::default()).unwrap();
            w.write_all(body.as_bytes()).unwrap();
        }
        w.finish().unwrap().into_inner()
    }

    #[test]
    fn rendering_drops_the_calc_chain() {
        let dir = std::env::temp_dir().join("fuellog_template_calc_chain");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("template.xlsx");

        let bytes = zip_of(&[
            (
                CONTENT_TYPES,
                r#"<Types><Override PartName="/xl/workbook.xml" ContentType="wb"/><Override PartName="/xl/calcChain.xml" ContentType="cc"/></Types>"#,
            ),
            (
                "xl/workbook.xml",
                r#"<workbook><sheets><sheet name="Hoja" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                WORKBOOK_RELS,
                r#"<Relationships><Relationship Id="rId1" Type="ws" Target="worksheets/sheet1.xml"/><Relationship Id="rId9" Type="cc" Target="calcChain.xml"/></Relationships>"#,
            ),
            (
                "xl/worksheets/sheet1.xml",
                r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c></row><row r="2"><c r="A2"><f>1+1</f><v>2</v></c></row></sheetData></worksheet>"#,
            ),
            (CALC_CHAIN, r#"<calcChain><c r="A2" i="1"/></calcChain>"#),
        ]);
        fs::write(&path, bytes).unwrap();

        let out = render_template(&path, "Hoja", &[vec![Cell::Number(3.0)]], 1).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(out)).unwrap();

        assert!(archive.by_name(CALC_CHAIN).is_err());
        let types = read_entry(&mut archive, CONTENT_TYPES).unwrap();
        assert!(!types.contains("calcChain"));
        assert!(types.contains("/xl/workbook.xml"));
        let rels = read_entry(&mut archive, WORKBOOK_RELS).unwrap();
        assert!(!rels.contains("calcChain"));
        assert!(rels.contains("worksheets/sheet1.xml"));
        let sheet = read_entry(&mut archive, "xl/worksheets/sheet1.xml").unwrap();
        assert!(sheet.contains(r#"<c r="A2"><v>3</v></c>"#));
        assert!(!sheet.contains("<f>"));

        fs::remove_dir_all(&dir).ok();
    }
}
