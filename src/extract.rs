//! PPTX text extraction: walk slides → shapes → paragraphs → runs.
//!
//! A `.pptx` file is a ZIP package of XML parts. Text lives in run elements
//! (`a:r`) nested under paragraphs (`a:p`) inside a shape's text body
//! (`p:txBody`). This module streams each slide part through `quick-xml`
//! rather than building a DOM — slide decks routinely reach hundreds of
//! parts, and the extractor only ever needs the run text.
//!
//! ## Output shape
//!
//! The result is every run's text joined with `"\n"`, in document order.
//! Paragraph and shape boundaries are not marked, and a run without text
//! contributes an empty line. This flat form is the wire contract of
//! `deck2text`; callers that need structure should not reconstruct it from
//! the string.
//!
//! ## What counts as a run
//!
//! Only `a:r` elements directly under a shape's `p:txBody`. Line breaks
//! (`a:br`) and fields like slide numbers (`a:fld`) are not runs and
//! contribute nothing. Table cell text (`a:txBody` inside `a:tbl`) belongs
//! to the table part model, not the shape text frame, and is excluded.
//! Shapes nested inside a group (`p:grpSp`) are group members, not top-level
//! shapes with a text frame, so their text contributes nothing either.
//!
//! ## Slide ordering
//!
//! Slide parts are visited in presentation order: the `sldIdLst` in
//! `ppt/presentation.xml` gives relationship ids whose targets are resolved
//! through `ppt/_rels/presentation.xml.rels`. Packages missing the id list
//! fall back to numeric ordering of `ppt/slides/slideN.xml` names (a plain
//! lexicographic sort would put `slide10` before `slide2`).

use crate::error::ExtractError;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Extract all run text from a presentation file.
///
/// # Example
/// ```rust,no_run
/// let text = deck2img::extract::extract_text("deck.pptx")?;
/// for line in text.lines() {
///     println!("{line}");
/// }
/// # Ok::<(), deck2img::ExtractError>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String, ExtractError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path)?;
    extract_text_from_reader(file)
}

/// Extract all run text from an in-memory or streamed PPTX package.
///
/// Useful when the presentation comes from a database blob or network body
/// rather than a file on disk.
pub fn extract_text_from_reader<R: Read + Seek>(reader: R) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(reader).map_err(|e| ExtractError::NotAPresentation {
        detail: e.to_string(),
    })?;

    let slide_parts = ordered_slide_parts(&mut archive)?;

    let mut runs: Vec<String> = Vec::new();
    for part in &slide_parts {
        let xml = read_part(&mut archive, part)?;
        collect_run_texts(&xml, part, &mut runs)?;
    }

    Ok(runs.join("\n"))
}

// ── Slide ordering ───────────────────────────────────────────────────────

/// Resolve the slide part names in presentation order.
fn ordered_slide_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>, ExtractError> {
    let has_presentation_part = archive.file_names().any(|n| n == PRESENTATION_PART);

    if has_presentation_part {
        let pres_xml = read_part(archive, PRESENTATION_PART)?;
        if let Ok(rels_xml) = read_part(archive, PRESENTATION_RELS_PART) {
            let ordered = slides_from_manifest(&pres_xml, &rels_xml)?;
            if !ordered.is_empty() {
                return Ok(ordered);
            }
        }
    }

    let fallback = slides_by_filename_order(archive);
    if fallback.is_empty() && !has_presentation_part {
        return Err(ExtractError::NotAPresentation {
            detail: "package contains no presentation part and no slides".into(),
        });
    }
    Ok(fallback)
}

/// Slide part names in `sldIdLst` order, resolved through the relationship
/// table. Relationship ids without a target are skipped.
fn slides_from_manifest(pres_xml: &str, rels_xml: &str) -> Result<Vec<String>, ExtractError> {
    let targets = relationship_targets(rels_xml)?;
    let ids = slide_id_refs(pres_xml)?;
    Ok(ids
        .iter()
        .filter_map(|rid| targets.get(rid))
        .map(|target| normalize_part_name(target))
        .collect())
}

/// Parse `Relationship` entries into an id → target map.
fn relationship_targets(rels_xml: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut reader = Reader::from_str(rels_xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value().unwrap_or_default().into_owned()),
                        b"Target" => {
                            target = Some(attr.unescape_value().unwrap_or_default().into_owned())
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::SlideXml {
                    name: PRESENTATION_RELS_PART.into(),
                    detail: e.to_string(),
                })
            }
            _ => {}
        }
    }

    Ok(targets)
}

/// The `r:id` references inside `sldIdLst`, in document order.
fn slide_id_refs(pres_xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(pres_xml);
    let mut in_list = false;
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = true;
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if in_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        ids.push(attr.unescape_value().unwrap_or_default().into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::SlideXml {
                    name: PRESENTATION_PART.into(),
                    detail: e.to_string(),
                })
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Relationship targets are relative to `ppt/`; absolute targets keep their
/// own path.
fn normalize_part_name(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("ppt/") {
        trimmed.to_string()
    } else {
        format!("ppt/{}", trimmed)
    }
}

/// All `ppt/slides/slideN.xml` parts, sorted by N.
fn slides_by_filename_order<R: Read + Seek>(archive: &ZipArchive<R>) -> Vec<String> {
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slides.sort_by_key(|(n, _)| *n);
    slides.into_iter().map(|(_, name)| name).collect()
}

/// `ppt/slides/slide12.xml` → `Some(12)`; anything else → `None`.
fn slide_number(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// ── Run collection ───────────────────────────────────────────────────────

/// Read one package part into a string.
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<String, ExtractError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::NotAPresentation {
            detail: format!("missing part '{}': {}", name, e),
        })?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Append the text of every run in `xml` to `runs`, in document order.
///
/// State machine over three nesting levels: `p:txBody` (shape text frame),
/// `a:r` (run), `a:t` (run text). Full qualified names are matched so the
/// drawing-ml `a:txBody` used by table cells never opens the shape state,
/// and a `p:grpSp` depth counter keeps group-member shapes from opening it.
fn collect_run_texts(
    xml: &str,
    part_name: &str,
    runs: &mut Vec<String>,
) -> Result<(), ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut group_depth = 0usize;
    let mut in_text_body = false;
    let mut in_run = false;
    let mut in_text = false;
    let mut current_run = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"p:grpSp" => group_depth += 1,
                b"p:txBody" if group_depth == 0 => in_text_body = true,
                b"a:r" if in_text_body => {
                    in_run = true;
                    current_run.clear();
                }
                b"a:t" if in_run => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                // A self-closed run still contributes an empty entry.
                if in_text_body && e.name().as_ref() == b"a:r" {
                    runs.push(String::new());
                }
            }
            Ok(Event::Text(ref t)) if in_text => {
                current_run.push_str(&t.decode().unwrap_or_default());
            }
            // Entity and character references arrive as separate events;
            // resolve them back into the run's literal text.
            Ok(Event::GeneralRef(ref r)) if in_text => {
                append_general_ref(r, &mut current_run);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"p:grpSp" => group_depth = group_depth.saturating_sub(1),
                b"p:txBody" => in_text_body = false,
                b"a:r" if in_run => {
                    runs.push(std::mem::take(&mut current_run));
                    in_run = false;
                }
                b"a:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::SlideXml {
                    name: part_name.to_string(),
                    detail: e.to_string(),
                })
            }
            _ => {}
        }
    }

    Ok(())
}

/// Resolve one `&…;` reference into `out`.
///
/// Numeric character references and the five predefined XML entities are
/// resolved to their characters; an unknown (DTD-defined) entity is kept
/// verbatim rather than silently dropped.
fn append_general_ref(r: &BytesRef<'_>, out: &mut String) {
    if let Ok(Some(ch)) = r.resolve_char_ref() {
        out.push(ch);
        return;
    }
    match r.decode().unwrap_or_default().as_ref() {
        "amp" => out.push('&'),
        "lt" => out.push('<'),
        "gt" => out.push('>'),
        "apos" => out.push('\''),
        "quot" => out.push('"'),
        name => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
    }
}

/// Strip any namespace prefix from a qualified XML name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{SimpleFileOptions, ZipWriter};

    const SLD_NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

    fn slide(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:sld {SLD_NS}><p:cSld><p:spTree>{body}</p:spTree></p:cSld></p:sld>"#
        )
    }

    fn build_pptx(parts: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn runs_are_joined_with_newlines() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody>
                 <a:p><a:r><a:t>Title text</a:t></a:r></a:p>
                 <a:p><a:r><a:t>Second run</a:t></a:r><a:r><a:t> same paragraph</a:t></a:r></a:p>
               </p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "Title text\nSecond run\n same paragraph");
    }

    #[test]
    fn empty_runs_contribute_empty_lines() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody>
                 <a:p><a:r><a:t>before</a:t></a:r><a:r></a:r><a:r><a:t>after</a:t></a:r></a:p>
               </p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "before\n\nafter");
    }

    #[test]
    fn shapes_without_text_frames_are_skipped() {
        let slide_xml = slide(
            r#"<p:pic><p:nvPicPr></p:nvPicPr></p:pic>
               <p:sp><p:txBody><a:p><a:r><a:t>kept</a:t></a:r></a:p></p:txBody></p:sp>
               <p:graphicFrame><a:tbl><a:tr><a:tc>
                 <a:txBody><a:p><a:r><a:t>table cell</a:t></a:r></a:p></a:txBody>
               </a:tc></a:tr></a:tbl></p:graphicFrame>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "kept");
    }

    #[test]
    fn fields_and_breaks_are_not_runs() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody>
                 <a:p><a:r><a:t>real</a:t></a:r><a:br/><a:fld id="{X}" type="slidenum"><a:t>7</a:t></a:fld></a:p>
               </p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "real");
    }

    #[test]
    fn entities_are_unescaped_and_whitespace_kept() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody><a:p><a:r><a:t>  Q&amp;A &lt;open&gt;</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "  Q&A <open>");
    }

    #[test]
    fn character_references_resolve_inside_runs() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody><a:p><a:r><a:t>caf&#233; &#x2013; Q&amp;A</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "café \u{2013} Q&A");
    }

    #[test]
    fn grouped_shape_text_is_excluded() {
        let slide_xml = slide(
            r#"<p:sp><p:txBody><a:p><a:r><a:t>top level</a:t></a:r></a:p></p:txBody></p:sp>
               <p:grpSp>
                 <p:sp><p:txBody><a:p><a:r><a:t>inside group</a:t></a:r></a:p></p:txBody></p:sp>
                 <p:grpSp>
                   <p:sp><p:txBody><a:p><a:r><a:t>nested group</a:t></a:r></a:p></p:txBody></p:sp>
                 </p:grpSp>
               </p:grpSp>
               <p:sp><p:txBody><a:p><a:r><a:t>after group</a:t></a:r></a:p></p:txBody></p:sp>"#,
        );
        let pptx = build_pptx(&[("ppt/slides/slide1.xml", &slide_xml)]);

        // Group members are not top-level shapes with a text frame.
        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "top level\nafter group");
    }

    #[test]
    fn slide_order_follows_the_id_list() {
        let pres = format!(
            r#"<?xml version="1.0"?><p:presentation {SLD_NS} xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                 <p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst>
               </p:presentation>"#
        );
        let rels = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
             <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
             <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
           </Relationships>"#;
        let first = slide(r#"<p:sp><p:txBody><a:p><a:r><a:t>one</a:t></a:r></a:p></p:txBody></p:sp>"#);
        let second = slide(r#"<p:sp><p:txBody><a:p><a:r><a:t>two</a:t></a:r></a:p></p:txBody></p:sp>"#);
        let pptx = build_pptx(&[
            (PRESENTATION_PART, &pres),
            (PRESENTATION_RELS_PART, rels),
            ("ppt/slides/slide1.xml", &first),
            ("ppt/slides/slide2.xml", &second),
        ]);

        // The id list names slide2 first.
        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "two\none");
    }

    #[test]
    fn filename_fallback_sorts_numerically() {
        let mk = |t: &str| slide(&format!("<p:sp><p:txBody><a:p><a:r><a:t>{t}</a:t></a:r></a:p></p:txBody></p:sp>"));
        let (s1, s2, s10) = (mk("s1"), mk("s2"), mk("s10"));
        let pptx = build_pptx(&[
            ("ppt/slides/slide10.xml", &s10),
            ("ppt/slides/slide1.xml", &s1),
            ("ppt/slides/slide2.xml", &s2),
        ]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "s1\ns2\ns10");
    }

    #[test]
    fn slide_number_parsing() {
        assert_eq!(slide_number("ppt/slides/slide1.xml"), Some(1));
        assert_eq!(slide_number("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_number("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_number("ppt/slideLayouts/slideLayout1.xml"), None);
        assert_eq!(slide_number("ppt/slides/slide.xml"), None);
    }

    #[test]
    fn not_a_zip_is_not_a_presentation() {
        let err = extract_text_from_reader(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPresentation { .. }));
    }

    #[test]
    fn zip_without_slides_is_not_a_presentation() {
        let pptx = build_pptx(&[("word/document.xml", "<w:document/>")]);
        let err = extract_text_from_reader(pptx).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPresentation { .. }));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = extract_text("/no/such/deck.pptx").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn presentation_with_empty_slide_list_falls_back_to_filenames() {
        let pres = format!(
            r#"<?xml version="1.0"?><p:presentation {SLD_NS}><p:sldIdLst></p:sldIdLst></p:presentation>"#
        );
        let only = slide(r#"<p:sp><p:txBody><a:p><a:r><a:t>still found</a:t></a:r></a:p></p:txBody></p:sp>"#);
        let pptx = build_pptx(&[
            (PRESENTATION_PART, &pres),
            ("ppt/slides/slide1.xml", &only),
        ]);

        let text = extract_text_from_reader(pptx).unwrap();
        assert_eq!(text, "still found");
    }
}
