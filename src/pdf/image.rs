//! Image data URLs and their PDF image XObjects

use base64::Engine;
use image::{DynamicImage, ImageFormat};
use lopdf::{dictionary, Document, ObjectId, Stream};
use std::io::Cursor;

use crate::error::{Error, Result};
use crate::model::FieldType;

const PNG_PREFIX: &str = "data:image/png;base64,";
const JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// Image bytes taken out of a data URL
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Parse a PNG or JPEG base64 data URL.
    ///
    /// Any other prefix is rejected with an error naming `field_type`.
    pub fn from_data_url(field_type: FieldType, value: &str) -> Result<Self> {
        let (format, payload) = if let Some(rest) = value.strip_prefix(PNG_PREFIX) {
            (ImageFormat::Png, rest)
        } else if let Some(rest) = value.strip_prefix(JPEG_PREFIX) {
            (ImageFormat::Jpeg, rest)
        } else {
            return Err(Error::UnsupportedImageEncoding { field_type });
        };

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
        Ok(Self { format, bytes })
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        Ok(image::load_from_memory_with_format(&self.bytes, self.format)?)
    }
}

/// Build a `data:<mime>;base64,<payload>` URL
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Encode an image as PNG and wrap it in a data URL
pub fn png_data_url(image: &DynamicImage) -> Result<String> {
    let mut png_bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(to_data_url(ImageFormat::Png.to_mime_type(), &png_bytes))
}

/// An image embedded in a document, ready to be painted with `Do`
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Add `image` to `doc` as an RGB image XObject.
///
/// Transparency becomes a DeviceGray soft mask; fully opaque images get
/// none. Pixel streams are Flate compressed.
pub fn embed_image(doc: &mut Document, image: &DynamicImage) -> Result<EmbeddedImage> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if alpha.iter().any(|&a| a != u8::MAX) {
        let mut smask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        );
        smask.compress()?;
        let smask_id = doc.add_object(smask);
        image_dict.set("SMask", smask_id);
    }

    let mut stream = Stream::new(image_dict, rgb);
    stream.compress()?;
    let id = doc.add_object(stream);

    Ok(EmbeddedImage { id, width, height })
}
