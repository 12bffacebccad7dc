// src/pdf.rs

//! PDF document generator. Stamps the profile and reasons onto page 1 of a
//! template, or onto a blank A4 page when the template is empty.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::command::attestation::types::{DocumentGenerator, Profile};
use crate::error::{FormError, FormResult};
use crate::normalize::to_ascii;

/// Resource name for the stamped font; unlikely to collide with template fonts.
const FONT_NAME: &str = "AttF1";
const FONT_SIZE: i64 = 11;

const A4_WIDTH: i64 = 595;
const A4_HEIGHT: i64 = 842;

const LEFT: i64 = 72;
const TOP: i64 = 700;
const LINE_STEP: i64 = 20;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfStamper;

impl PdfStamper {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentGenerator for PdfStamper {
    fn generate(&self, profile: &Profile, reasons: &str, template: &[u8]) -> FormResult<Vec<u8>> {
        let mut doc = if template.is_empty() {
            blank_a4()
        } else {
            Document::load_mem(template).map_err(lopdf_err)?
        };

        if doc.is_encrypted() {
            return Err(FormError::GenerationFailure(
                "template PDF is encrypted".to_string(),
            ));
        }

        let page_id = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or_else(|| FormError::GenerationFailure("template has no pages".to_string()))?;

        install_font(&mut doc, page_id)?;

        let content = stamp_content(&stamp_lines(profile, reasons))?;
        doc.add_page_contents(page_id, content).map_err(lopdf_err)?;

        let mut out = Vec::new();
        write_pdf(&mut doc, &mut out)?;
        Ok(out)
    }
}

fn write_pdf<W: Write>(doc: &mut Document, out: &mut W) -> FormResult<()> {
    doc.save_to(out)
        .map_err(|e| FormError::GenerationFailure(e.to_string()))
}

fn lopdf_err(err: lopdf::Error) -> FormError {
    FormError::GenerationFailure(format!("pdf error: {err}"))
}

/// Human-readable lines in printing order. Missing profile keys print empty.
pub fn stamp_lines(profile: &Profile, reasons: &str) -> Vec<String> {
    let get = |k: &str| profile.get(k).map(String::as_str).unwrap_or("");

    vec![
        format!("Nom et prenom : {} {}", get("firstname"), get("lastname")),
        format!("Ne(e) le : {} a {}", get("birthday"), get("placeofbirth")),
        format!(
            "Demeurant : {} {} {}",
            get("address"),
            get("zipcode"),
            get("city")
        ),
        format!("Motif(s) : {}", to_ascii(reasons)),
        format!(
            "Fait a {}, le {} a {}",
            get("city"),
            get("datesortie"),
            get("heuresortie")
        ),
    ]
}

fn stamp_content(lines: &[String]) -> FormResult<Vec<u8>> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(FONT_NAME.into()), FONT_SIZE.into()]),
        Operation::new("Td", vec![LEFT.into(), TOP.into()]),
    ];

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ops.push(Operation::new("Td", vec![0.into(), (-LINE_STEP).into()]));
        }
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.as_str())],
        ));
    }

    ops.push(Operation::new("ET", vec![]));
    ops.push(Operation::new("Q", vec![]));

    Content { operations: ops }.encode().map_err(lopdf_err)
}

/// Register a Helvetica font under [`FONT_NAME`] in the page resources.
fn install_font(doc: &mut Document, page_id: ObjectId) -> FormResult<()> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let page = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(lopdf_err)?
        .clone();
    let mut resources = resolve_dict(doc, page.get(b"Resources").ok());
    let mut fonts = resolve_dict(doc, resources.get(b"Font").ok());
    fonts.set(FONT_NAME, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let page_mut = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(lopdf_err)?;
    page_mut.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Inline or referenced dictionary, else an empty one.
fn resolve_dict(doc: &Document, obj: Option<&Object>) -> Dictionary {
    match obj {
        Some(Object::Dictionary(d)) => d.clone(),
        Some(Object::Reference(id)) => doc
            .get_object(*id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .cloned()
            .unwrap_or_default(),
        _ => Dictionary::new(),
    }
}

fn blank_a4() -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {},
        "MediaBox" => vec![0.into(), 0.into(), A4_WIDTH.into(), A4_HEIGHT.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

// ======================================================
// Unit Tests
// ======================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        [
            ("firstname", "Jean"),
            ("lastname", "Dupont"),
            ("birthday", "01/01/1970"),
            ("placeofbirth", "Lyon"),
            ("address", "999 avenue de France"),
            ("city", "Paris"),
            ("zipcode", "75001"),
            ("datesortie", "02/11/2020"),
            ("heuresortie", "09:10"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn page_text(pdf: &[u8]) -> String {
        let doc = Document::load_mem(pdf).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn lines_follow_profile() {
        let lines = stamp_lines(&profile(), "Travail, Santé");
        assert_eq!(lines[0], "Nom et prenom : Jean Dupont");
        assert_eq!(lines[3], "Motif(s) : Travail, Sante");
        assert_eq!(lines[4], "Fait a Paris, le 02/11/2020 a 09:10");
    }

    #[test]
    fn stamps_blank_page_when_no_template() {
        let pdf = PdfStamper::new()
            .generate(&profile(), "Travail", &[])
            .unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        let text = page_text(&pdf);
        assert!(text.contains("Jean Dupont"));
        assert!(text.contains(FONT_NAME));
    }

    #[test]
    fn stamps_onto_given_template() {
        let mut tpl = Vec::new();
        blank_a4().save_to(&mut tpl).unwrap();

        let pdf = PdfStamper::new().generate(&profile(), "Sport", &tpl).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(page_text(&pdf).contains("Motif(s) : Sport"));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_error_is_generation_failure() {
        let mut doc = blank_a4();
        let err = write_pdf(&mut doc, &mut BrokenSink).unwrap_err();
        match err {
            FormError::GenerationFailure(msg) => assert!(msg.contains("disk full")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_template_is_generation_failure() {
        let err = PdfStamper::new()
            .generate(&profile(), "x", b"not a pdf")
            .unwrap_err();
        assert!(matches!(err, FormError::GenerationFailure(_)));
    }
}
