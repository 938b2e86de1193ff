//! Stamp field values onto the first page of a document

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::geometry::{place, PageBox, Placement};
use super::image::{embed_image, EncodedImage};
use crate::error::{Error, Result};
use crate::model::NormalizedField;

/// Font size of stamped text runs, in points
pub const FONT_SIZE: f64 = 12.0;
/// Distance between baselines when a value spans several lines
pub const LINE_HEIGHT: f64 = 24.0;

const FONT_PREFIX: &str = "FStamp";
const IMAGE_PREFIX: &str = "ImStamp";

/// Result of stamping a document
#[derive(Debug, Clone)]
pub struct StampOutcome {
    /// Serialized stamped document
    pub bytes: Vec<u8>,
    /// Size of the first page
    pub page: PageBox,
    /// Ids (or positions) of fields painted onto the page
    pub stamped: Vec<String>,
    /// Fields that were skipped: missing ratios, empty box, empty value or unknown type
    pub skipped: Vec<String>,
}

/// Stamp `fields` onto the first page of `original` and serialize the result.
///
/// Fields without a usable box or value are skipped. An image or signature
/// value that is not a PNG/JPEG data URL fails the whole call.
pub fn stamp_fields(original: &[u8], fields: &[NormalizedField]) -> Result<StampOutcome> {
    let mut doc = Document::load_mem(original)?;
    let page_id = first_page(&doc)?;
    let page = page_box(&doc, page_id)?;

    let mut stamp = PageStamp::new(&doc, page_id);
    let mut stamped = Vec::new();
    let mut skipped = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let label = field
            .id
            .clone()
            .unwrap_or_else(|| format!("#{}", index));

        let placement = match place(field, page) {
            Some(p) => p,
            None => {
                tracing::debug!(field_id = %label, "Skipping field without a usable box");
                skipped.push(label);
                continue;
            }
        };

        let value = field.value_str();
        if value.is_empty() {
            tracing::debug!(field_id = %label, "Skipping field with empty value");
            skipped.push(label);
            continue;
        }

        if field.field_type.is_textual() {
            stamp.draw_text(&placement, value);
        } else if field.field_type.is_graphic() {
            let encoded = EncodedImage::from_data_url(field.field_type, value)?;
            let image = encoded.decode()?;
            let embedded = embed_image(&mut doc, &image)?;
            let fitted = placement.fit_image(embedded.width as f64, embedded.height as f64);
            stamp.draw_image(&fitted, embedded.id);
        } else {
            tracing::debug!(field_id = %label, field_type = %field.field_type, "Skipping unknown field type");
            skipped.push(label);
            continue;
        }

        stamped.push(label);
    }

    if !stamp.is_empty() {
        stamp.apply(&mut doc, page_id)?;
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(StampOutcome {
        bytes,
        page,
        stamped,
        skipped,
    })
}

/// Read the size of the first page without modifying anything
pub fn first_page_box(data: &[u8]) -> Result<PageBox> {
    let doc = Document::load_mem(data)?;
    let page_id = first_page(&doc)?;
    page_box(&doc, page_id)
}

fn first_page(doc: &Document) -> Result<ObjectId> {
    doc.get_pages()
        .into_values()
        .next()
        .ok_or_else(|| Error::InvalidPdf {
            reason: "document has no pages".to_string(),
        })
}

/// MediaBox width and height, inherited through the page tree
fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let media_box = inherited(doc, page_id, b"MediaBox").ok_or_else(|| Error::InvalidPdf {
        reason: "first page has no MediaBox".to_string(),
    })?;

    let corners = resolve(doc, media_box)
        .as_array()
        .ok()
        .filter(|arr| arr.len() == 4)
        .and_then(|arr| {
            arr.iter()
                .map(|o| resolve(doc, o).as_float().ok().map(f64::from))
                .collect::<Option<Vec<f64>>>()
        })
        .ok_or_else(|| Error::InvalidPdf {
            reason: "malformed MediaBox".to_string(),
        })?;

    Ok(PageBox {
        width: (corners[2] - corners[0]).abs(),
        height: (corners[3] - corners[1]).abs(),
    })
}

/// Look up a page attribute, walking up `Parent` links when the page lacks it
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // Bounded walk in case of a cyclic page tree
    for _ in 0..64 {
        let dict = doc.get_dictionary(current?).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

/// Clone a dictionary entry of `resources`, following a reference if needed
fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Dictionary {
    resources
        .get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

fn unused_name(dict: &Dictionary, prefix: &str) -> String {
    let mut n = 0;
    loop {
        let candidate = format!("{}{}", prefix, n);
        if !dict.has(candidate.as_bytes()) {
            return candidate;
        }
        n += 1;
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split("\r\n")
        .flat_map(|part| part.split(['\n', '\r']))
        .collect()
}

/// Encode text for a WinAnsi simple font, replacing what it cannot show
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Operations and resources accumulated for one page
struct PageStamp {
    resources: Dictionary,
    fonts: Dictionary,
    xobjects: Dictionary,
    font_name: Option<String>,
    operations: Vec<Operation>,
}

impl PageStamp {
    fn new(doc: &Document, page_id: ObjectId) -> Self {
        let resources = inherited(doc, page_id, b"Resources")
            .and_then(|obj| resolve(doc, obj).as_dict().ok())
            .cloned()
            .unwrap_or_default();
        let fonts = sub_dictionary(doc, &resources, b"Font");
        let xobjects = sub_dictionary(doc, &resources, b"XObject");

        Self {
            resources,
            fonts,
            xobjects,
            font_name: None,
            operations: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn font(&mut self) -> String {
        if let Some(name) = &self.font_name {
            return name.clone();
        }
        let name = unused_name(&self.fonts, FONT_PREFIX);
        self.fonts.set(
            name.as_str(),
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            },
        );
        self.font_name = Some(name.clone());
        name
    }

    /// One text run; line breaks in `text` move down by [`LINE_HEIGHT`]
    /// from the first baseline
    fn draw_text(&mut self, placement: &Placement, text: &str) {
        let font = self.font();
        let (x, y) = placement.text_origin();
        let lines = split_lines(text);

        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), real(FONT_SIZE)]),
            Operation::new("g", vec![0.into()]),
        ]);
        if lines.len() > 1 {
            self.operations
                .push(Operation::new("TL", vec![real(LINE_HEIGHT)]));
        }
        self.operations
            .push(Operation::new("Td", vec![real(x), real(y)]));
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.operations.push(Operation::new("T*", vec![]));
            }
            self.operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(win_ansi(line))],
            ));
        }
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn draw_image(&mut self, placement: &Placement, image_id: ObjectId) {
        let name = unused_name(&self.xobjects, IMAGE_PREFIX);
        self.xobjects.set(name.as_str(), image_id);
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(placement.width),
                    0.into(),
                    0.into(),
                    real(placement.height),
                    real(placement.x),
                    real(placement.y),
                ],
            ),
            Operation::new("Do", vec![name.into()]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Install resources inline on the page and append the stamp after the
    /// existing content, isolated by a save/restore pair around it
    fn apply(self, doc: &mut Document, page_id: ObjectId) -> Result<()> {
        let PageStamp {
            mut resources,
            fonts,
            xobjects,
            operations,
            ..
        } = self;

        if !fonts.is_empty() {
            resources.set("Font", fonts);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let existing = doc.get_page_contents(page_id);
        let mut contents: Vec<Object> = Vec::with_capacity(existing.len() + 2);

        let mut stamp_ops = Vec::with_capacity(operations.len() + 1);
        if !existing.is_empty() {
            let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(save_id.into());
            contents.extend(existing.into_iter().map(Object::from));
            stamp_ops.push(Operation::new("Q", vec![]));
        }
        stamp_ops.extend(operations);

        // Streams are concatenated when read, keep the boundary a token separator
        let mut data = b"\n".to_vec();
        data.extend(
            Content {
                operations: stamp_ops,
            }
            .encode()?,
        );
        let mut stream = Stream::new(Dictionary::new(), data);
        stream.compress()?;
        contents.push(doc.add_object(stream).into());

        let page = doc.get_dictionary_mut(page_id)?;
        page.set("Resources", resources);
        page.set("Contents", contents);
        Ok(())
    }
}
