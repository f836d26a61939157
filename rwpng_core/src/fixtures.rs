/*!
# `RWPNG` - Test Fixtures
*/

use png::{
	BitDepth,
	ColorType,
	Encoder,
};



/// # Adam7 Passes.
///
/// Starting column and row, then column and row steps.
const ADAM7: [(usize, usize, usize, usize); 7] = [
	(0, 0, 8, 8),
	(4, 0, 8, 8),
	(0, 4, 4, 8),
	(2, 0, 4, 4),
	(0, 2, 2, 4),
	(1, 0, 2, 2),
	(0, 1, 1, 2),
];



/// # Encode.
///
/// Build a PNG in memory. `data` holds the raw scanlines, without filter
/// bytes, packed the way the color type and depth require.
pub(crate) fn encode(
	width: u32,
	height: u32,
	color: ColorType,
	depth: BitDepth,
	palette: Option<&[u8]>,
	trns: Option<&[u8]>,
	data: &[u8],
) -> Vec<u8> {
	let mut out = Vec::new();

	{
		let mut enc = Encoder::new(&mut out, width, height);
		enc.set_color(color);
		enc.set_depth(depth);
		if let Some(p) = palette { enc.set_palette(p.to_vec()); }
		if let Some(t) = trns { enc.set_trns(t.to_vec()); }

		let mut writer = enc.write_header().expect("Failed to write PNG header.");
		writer.write_image_data(data).expect("Failed to write PNG data.");
		writer.finish().expect("Failed to finish PNG.");
	}

	out
}

/// # Encode (Interlaced).
///
/// Build an Adam7-interlaced, eight-bit PNG in memory. The encoder can't
/// interlace, so the passes and chunks are assembled by hand. `data` holds
/// the full, non-interlaced scanlines with `bpp` bytes per pixel.
pub(crate) fn encode_interlaced(
	width: u32,
	height: u32,
	color: ColorType,
	bpp: usize,
	data: &[u8],
) -> Vec<u8> {
	let w = width as usize;
	let h = height as usize;
	assert_eq!(data.len(), w * h * bpp, "Bad fixture data length.");

	let mut raw = Vec::new();
	for (x0, y0, dx, dy) in ADAM7 {
		if x0 >= w || y0 >= h { continue; }
		for y in (y0..h).step_by(dy) {
			raw.push(0); // Filter: none.
			for x in (x0..w).step_by(dx) {
				let idx = (y * w + x) * bpp;
				raw.extend_from_slice(&data[idx..idx + bpp]);
			}
		}
	}

	let mut ihdr = Vec::with_capacity(13);
	ihdr.extend_from_slice(&width.to_be_bytes());
	ihdr.extend_from_slice(&height.to_be_bytes());
	ihdr.extend_from_slice(&[8, color as u8, 0, 0, 1]);

	let mut out = crate::PNG_MAGIC.to_vec();
	push_chunk(&mut out, *b"IHDR", &ihdr);
	push_chunk(&mut out, *b"IDAT", &miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6));
	push_chunk(&mut out, *b"IEND", &[]);
	out
}

/// # Resize.
///
/// Rewrite the dimensions in a PNG's `IHDR`, fixing up its checksum, and
/// leave everything else alone.
pub(crate) fn resize(mut raw: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
	assert_eq!(&raw[12..16], b"IHDR", "Missing IHDR.");
	raw[16..20].copy_from_slice(&width.to_be_bytes());
	raw[20..24].copy_from_slice(&height.to_be_bytes());
	let crc = crc32fast::hash(&raw[12..29]);
	raw[29..33].copy_from_slice(&crc.to_be_bytes());
	raw
}

/// # Push Chunk.
fn push_chunk(out: &mut Vec<u8>, kind: [u8; 4], data: &[u8]) {
	let len = u32::try_from(data.len()).expect("Chunk too big.");
	out.extend_from_slice(&len.to_be_bytes());

	let start = out.len();
	out.extend_from_slice(&kind);
	out.extend_from_slice(data);
	let crc = crc32fast::hash(&out[start..]);
	out.extend_from_slice(&crc.to_be_bytes());
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_encode_interlaced() {
		// The reference decoder agrees with the hand-built passes.
		let data: Vec<u8> = (0..5 * 3 * 3).collect();
		let raw = encode_interlaced(5, 3, ColorType::Rgb, 3, &data);

		let mut decoder = png::Decoder::new(raw.as_slice());
		decoder.set_transformations(png::Transformations::IDENTITY);
		let mut reader = decoder.read_info().unwrap();
		assert!(reader.info().interlaced);

		let mut buf = vec![0; reader.output_buffer_size()];
		reader.next_frame(&mut buf).unwrap();
		assert_eq!(buf, data);
	}

	#[test]
	fn t_resize() {
		let raw = encode(1, 1, ColorType::Rgba, BitDepth::Eight, None, None, &[0; 4]);
		let raw = resize(raw, 300, 200);

		let decoder = png::Decoder::new(raw.as_slice());
		let reader = decoder.read_info().unwrap();
		assert_eq!(reader.info().size(), (300, 200));
	}
}
