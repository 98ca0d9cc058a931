//! PDF reconstruction: embed page JPEGs into a fresh document.
//!
//! The compressor never edits the source PDF. It builds a new document from
//! scratch, one page per source page, where each page is exactly the source
//! page's width × height in points and its content is a single full-bleed
//! DCTDecode image XObject. Output geometry therefore always matches source
//! geometry, no matter what DPI the page was rasterised at — the `cm`
//! matrix maps the image's unit square onto the full MediaBox.

use crate::error::PdfPressError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

/// Incrementally builds one output PDF for one input file.
pub struct PdfRebuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    file_name: String,
}

impl PdfRebuilder {
    /// Start an empty output document for the named input file (the name is
    /// only used in error messages).
    pub fn new(file_name: impl Into<String>) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            file_name: file_name.into(),
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append a page of `width_pts` × `height_pts` points whose sole content
    /// is `jpeg` drawn from (0,0) to the full page bounds.
    ///
    /// `pixel_width`/`pixel_height` are the JPEG's raster dimensions; they
    /// go into the image dictionary and are independent of the page size.
    pub fn add_jpeg_page(
        &mut self,
        width_pts: f32,
        height_pts: f32,
        pixel_width: u32,
        pixel_height: u32,
        jpeg: &[u8],
    ) -> Result<(), PdfPressError> {
        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => pixel_width as i64,
                "Height" => pixel_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "DCTDecode",
            },
            jpeg.to_vec(),
        ));

        // Image XObjects live in a unit square; scale it to the page box.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        width_pts.into(),
                        0.into(),
                        0.into(),
                        height_pts.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| PdfPressError::PdfWriteFailed {
            file: self.file_name.clone(),
            detail: format!("content stream: {e}"),
        })?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width_pts),
                Object::Real(height_pts),
            ],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);

        debug!(
            "Added page {} ({}x{} pt, {}x{} px image) to rebuilt '{}'",
            self.page_ids.len(),
            width_pts,
            height_pts,
            pixel_width,
            pixel_height,
            self.file_name
        );
        Ok(())
    }

    /// Close the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, PdfPressError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => self.page_ids.len() as i64,
                "Kids" => kids,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| PdfPressError::PdfWriteFailed {
                file: self.file_name,
                detail: e.to_string(),
            })?;
        Ok(out)
    }
}
