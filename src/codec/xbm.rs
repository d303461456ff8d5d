//! XBM export and data-array parsing.
//!
//! The bilevel raster is serialized to the X11 bitmap C-source format and the
//! byte array is then read back out of that text. Rows are padded to a whole
//! byte by the export; bit 0 of each byte is the leftmost pixel and a set bit
//! marks a lit pixel (luma above the midpoint).

use image::GrayImage;
use std::fmt::Write;
use thiserror::Error;

/// Number of byte literals written per line of the data array.
const BYTES_PER_LINE: usize = 12;

/// Error raised when the XBM data section cannot be located or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// No `=` separating the declaration from the array literal
    #[error("no data array assignment found")]
    MissingAssignment,
    /// The assigned value is not a `{ ... };` literal
    #[error("data array is not a braced literal terminated by ';'")]
    MissingArray,
    /// A token in the array is not a `0x`-prefixed byte
    #[error("invalid byte literal '{token}' at index {index}")]
    InvalidByte { index: usize, token: String },
    /// Parsed byte count disagrees with the declared dimensions
    #[error("expected {expected} data bytes, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Bytes per packed row for a raster `width` pixels wide.
pub fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Pack a grayscale raster into XBM bit order.
fn pack_rows(image: &GrayImage) -> Vec<u8> {
    let stride = row_stride(image.width());
    let mut data = vec![0u8; stride * image.height() as usize];
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[0] > 127 {
            let index = y as usize * stride + x as usize / 8;
            data[index] |= 1 << (x % 8);
        }
    }
    data
}

/// Render a bilevel raster as XBM source text.
///
/// `name` prefixes the `_width`, `_height` and `_bits` identifiers.
pub fn to_xbm(name: &str, image: &GrayImage) -> String {
    let data = pack_rows(image);
    let mut out = String::with_capacity(64 + data.len() * 6);

    // Writing into a String cannot fail
    let _ = writeln!(out, "#define {}_width {}", name, image.width());
    let _ = writeln!(out, "#define {}_height {}", name, image.height());
    let _ = writeln!(out, "static char {}_bits[] = {{", name);
    for (i, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let line: Vec<String> = chunk.iter().map(|b| format!("0x{:02x}", b)).collect();
        let last = (i + 1) * BYTES_PER_LINE >= data.len();
        let _ = writeln!(out, "{}{}", line.join(", "), if last { "" } else { "," });
    }
    out.push_str("};\n");
    out
}

/// Extract the data array of an XBM source text as raw bytes.
///
/// Whitespace is stripped before parsing, the value after the first `=` must
/// be a braced list of `0x`-prefixed hex bytes terminated by `;`. A trailing
/// comma inside the braces is accepted.
pub fn parse_bits(text: &str) -> Result<Vec<u8>, FormatError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let (_, value) = compact.split_once('=').ok_or(FormatError::MissingAssignment)?;
    let body = value
        .strip_suffix(';')
        .and_then(|v| v.strip_prefix('{'))
        .and_then(|v| v.strip_suffix('}'))
        .ok_or(FormatError::MissingArray)?;

    if body.is_empty() {
        return Ok(Vec::new());
    }

    let body = body.strip_suffix(',').unwrap_or(body);
    body.split(',')
        .enumerate()
        .map(|(index, token)| parse_byte(token).ok_or_else(|| invalid_byte(index, token)))
        .collect()
}

fn parse_byte(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X"))?;
    if digits.is_empty() || digits.len() > 2 {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

fn invalid_byte(index: usize, token: &str) -> FormatError {
    FormatError::InvalidByte { index, token: token.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_row_stride() {
        assert_eq!(row_stride(1), 1);
        assert_eq!(row_stride(8), 1);
        assert_eq!(row_stride(9), 2);
        assert_eq!(row_stride(128), 16);
    }

    #[test]
    fn test_to_xbm_header() {
        let image = GrayImage::new(10, 3);
        let text = to_xbm("icon", &image);
        assert!(text.starts_with("#define icon_width 10\n#define icon_height 3\n"));
        assert!(text.contains("static char icon_bits[] = {"));
        assert!(text.trim_end().ends_with("};"));
    }

    #[test]
    fn test_pack_rows_lsb_first_with_padding() {
        // 10 pixels wide: two bytes per row, six padding bits in the second
        let mut image = GrayImage::new(10, 2);
        image.put_pixel(0, 0, Luma([255]));
        image.put_pixel(9, 0, Luma([255]));
        image.put_pixel(3, 1, Luma([200]));
        image.put_pixel(4, 1, Luma([100]));

        let text = to_xbm("t", &image);
        let bits = parse_bits(&text).unwrap();
        assert_eq!(bits, vec![0x01, 0x02, 0x08, 0x00]);
    }

    #[test]
    fn test_export_parse_many_lines() {
        let image = GrayImage::from_fn(64, 8, |x, y| Luma([if (x + y) % 3 == 0 { 255 } else { 0 }]));
        let text = to_xbm("big", &image);
        assert!(text.lines().count() > 5);
        assert_eq!(parse_bits(&text).unwrap(), pack_rows(&image));
    }

    #[test]
    fn test_parse_bits_tolerates_whitespace_and_trailing_comma() {
        let text = "#define a_width 8\n#define a_height 2\nstatic char a_bits[] = {\n  0xFF ,\n 0x0, };\n";
        assert_eq!(parse_bits(text).unwrap(), vec![0xff, 0x00]);
    }

    #[test]
    fn test_parse_bits_empty_array() {
        assert_eq!(parse_bits("static char a_bits[] = {};").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_parse_bits_missing_assignment() {
        assert_eq!(parse_bits("#define a_width 8"), Err(FormatError::MissingAssignment));
    }

    #[test]
    fn test_parse_bits_missing_braces() {
        assert_eq!(parse_bits("static char a_bits[] = 0x00, 0x01;"), Err(FormatError::MissingArray));
        assert_eq!(parse_bits("static char a_bits[] = { 0x00 }"), Err(FormatError::MissingArray));
    }

    #[test]
    fn test_parse_bits_invalid_tokens() {
        assert!(matches!(
            parse_bits("x = { 0x00, 12 };"),
            Err(FormatError::InvalidByte { index: 1, .. })
        ));
        assert!(matches!(
            parse_bits("x = { 0x100 };"),
            Err(FormatError::InvalidByte { index: 0, .. })
        ));
        assert!(matches!(
            parse_bits("x = { 0xZZ };"),
            Err(FormatError::InvalidByte { index: 0, .. })
        ));
        assert!(matches!(
            parse_bits("x = { 0x01,, 0x02 };"),
            Err(FormatError::InvalidByte { index: 1, .. })
        ));
    }
}
