//! Hand preedit images to cairo

use pgtk_core::{PgtkError, PgtkResult, PreeditImage};

/// Wrap a preedit image as a cairo surface, for painting in a draw func.
///
/// `ARgb32` is native-endian premultiplied, which is BGRA byte order on the
/// little-endian targets GTK4 ships on.
pub fn to_surface(image: &PreeditImage) -> PgtkResult<cairo::ImageSurface> {
    let width = image.width() as i32;
    let stride = image.stride() as i32;
    let expected = cairo::Format::ARgb32
        .stride_for_width(image.width())
        .map_err(|e| PgtkError::Render { message: e.to_string() })?;
    if stride != expected {
        return Err(PgtkError::InvalidImage {
            width: image.width(),
            height: image.height(),
            stride: image.stride(),
            len: image.data().len(),
        });
    }

    cairo::ImageSurface::create_for_data(
        image.data().to_vec(),
        cairo::Format::ARgb32,
        width,
        image.height() as i32,
        stride,
    )
    .map_err(|e| PgtkError::Render { message: e.to_string() })
}
