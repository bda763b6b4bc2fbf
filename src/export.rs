use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::{Arc, OnceLock};

use resvg::usvg;

use crate::error::ExportError;

pub const PRIMARY_MIME: &str = "application/xml";
pub const PNG_MIME: &str = "image/png";

/// Largest PNG side we will allocate a pixmap for
pub const MAX_RASTER_SIDE: u32 = 16384;

/// File name offered for a download: the document name verbatim, or
/// `diagram` when nothing is open.
pub fn download_file_name(name: Option<&str>, extension: &str) -> String {
    format!("{}.{}", name.unwrap_or("diagram"), extension)
}

/// Declared size of an SVG document.
///
/// The `viewBox` wins over `width`/`height`; anything missing or unparseable
/// falls through to `fallback`.
pub fn svg_dimensions(svg: &str, fallback: [f32; 2]) -> Result<(f32, f32), ExportError> {
    let doc = roxmltree::Document::parse(svg).map_err(|err| ExportError::Svg(err.to_string()))?;
    let root = doc.root_element();

    if let Some(view_box) = root.attribute("viewBox") {
        let parts: Vec<f32> = view_box
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect();
        if let [_, _, width, height] = parts[..] {
            if width > 0.0 && height > 0.0 {
                return Ok((width, height));
            }
        }
    }

    let width = root.attribute("width").and_then(parse_length);
    let height = root.attribute("height").and_then(parse_length);
    match (width, height) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Ok((fallback[0], fallback[1])),
    }
}

fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.parse::<f32>().ok().filter(|n| *n > 0.0)
}

/// Render `svg` to PNG bytes at `scale` times its declared size
pub fn rasterize_png(svg: &str, scale: f32, fallback: [f32; 2]) -> Result<Vec<u8>, ExportError> {
    let (width, height) = svg_dimensions(svg, fallback)?;
    let pixel_width = (width * scale).round() as u32;
    let pixel_height = (height * scale).round() as u32;
    // Float to int casts saturate, so infinite sizes land here too
    if pixel_width > MAX_RASTER_SIDE || pixel_height > MAX_RASTER_SIDE {
        return Err(ExportError::TooLarge {
            width: pixel_width,
            height: pixel_height,
            max: MAX_RASTER_SIDE,
        });
    }

    #[allow(unused_mut)]
    let mut options = usvg::Options::default();
    #[cfg(not(target_arch = "wasm32"))]
    {
        options.fontdb = system_fonts();
    }

    let tree = usvg::Tree::from_str(svg, &options).map_err(|err| ExportError::Svg(err.to_string()))?;
    let mut pixmap = tiny_skia::Pixmap::new(pixel_width, pixel_height).ok_or(ExportError::EmptyRaster {
        width: pixel_width,
        height: pixel_height,
    })?;

    let tree_size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        pixel_width as f32 / tree_size.width(),
        pixel_height as f32 / tree_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    log::debug!("Rasterized SVG to {}x{}", pixel_width, pixel_height);

    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    let image = image::RgbaImage::from_raw(pixel_width, pixel_height, rgba).ok_or(
        ExportError::EmptyRaster {
            width: pixel_width,
            height: pixel_height,
        },
    )?;

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// System fonts, loaded on first use and shared by every later export
#[cfg(not(target_arch = "wasm32"))]
fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("Loaded {} system font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Hand the bytes to the user: a file in the download directory on native,
/// a browser download on the web.
#[cfg(not(target_arch = "wasm32"))]
pub fn deliver(file_name: &str, bytes: &[u8], _mime: &str) -> Result<(), ExportError> {
    let dir = dirs::download_dir().unwrap_or_else(|| {
        log::warn!("No download directory, writing to the working directory");
        std::path::PathBuf::from(".")
    });
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    log::info!("Exported {}", path.display());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn deliver(file_name: &str, bytes: &[u8], mime: &str) -> Result<(), ExportError> {
    use web_sys::wasm_bindgen::JsCast;
    use web_sys::js_sys;

    let failed = |what: &str| ExportError::Download(what.to_owned());

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|_| failed("could not create blob"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|_| failed("could not create object url"))?;

    let result = (|| -> Result<(), ExportError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| failed("no document"))?;
        let anchor = document
            .create_element("a")
            .map_err(|_| failed("could not create anchor"))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| failed("anchor has the wrong type"))?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        Ok(())
    })();

    if web_sys::Url::revoke_object_url(&url).is_err() {
        log::warn!("Failed to revoke object url for {}", file_name);
    }
    if result.is_ok() {
        log::info!("Exported {}", file_name);
    }
    result
}
