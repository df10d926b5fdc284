//! Composites rasterized pages into a single A4 PDF. Each page bitmap is
//! embedded full-bleed; setting the embed DPI to the raster DPI makes the
//! bitmap's physical size come out at exactly 210x297mm.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::RgbImage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};

use crate::export::ExportError;
use crate::render::geometry::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

pub fn write_pdf(pages: &[RgbImage], dpi: u32, path: &Path) -> Result<(), ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "받아쓰기 학습지",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    for (index, bitmap) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let image = Image::from(ImageXObject {
            width: Px(bitmap.width() as usize),
            height: Px(bitmap.height() as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: bitmap.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
    }

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(())
}
