//! PDF processing layer
//!
//! This module stamps field values onto documents using lopdf: ratio to
//! user-space geometry, image data URLs and XObject embedding, and the page
//! stamper itself.

pub mod geometry;
pub mod image;
mod stamper;

pub use self::geometry::{place, PageBox, Placement};
pub use self::image::{embed_image, png_data_url, to_data_url, EmbeddedImage, EncodedImage};
pub use self::stamper::{first_page_box, stamp_fields, StampOutcome, FONT_SIZE, LINE_HEIGHT};
