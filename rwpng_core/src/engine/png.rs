/*!
# `RWPNG` - PNG Engine

This binds the `png` crate as the decompression engine.

The `png` crate fixes its transformations before it reads the header, but
which ones are wanted depends on the palette and transparency chunks. The
session therefore reads the metadata once on its own, rewinds, and starts
over with the transformations set once they have been requested.
*/

use super::{
	Engine,
	Header,
	Session,
	Transparency,
	transform::{
		engine_flags,
		Plan,
		png_transformations,
	},
};
use crate::{
	ColorKind,
	PngError,
	RowTable,
	Stream,
};
use rgb::{
	RGB16,
	RGB8,
};
use std::io::Read;



#[derive(Debug, Clone, Copy, Default)]
/// # PNG Engine.
///
/// The default decompression engine, backed by the `png` crate.
pub struct PngEngine;

impl Engine for PngEngine {
	fn open<'s>(&self, src: &'s mut dyn Stream, limit: usize)
	-> Result<Box<dyn Session + 's>, PngError> {
		let start = src.tell().ok_or(PngError::Stream)?;

		Ok(Box::new(PngSession {
			src: Some(src),
			reader: None,
			start,
			limit,
			header: None,
			palette: Vec::new(),
			trns: None,
			has_trns: false,
			flags: 0,
		}))
	}
}



/// # PNG Session.
struct PngSession<'s> {
	/// # Stream (Until the Real Decode Starts).
	src: Option<&'s mut dyn Stream>,

	/// # Reader (Once the Transforms Are Committed).
	reader: Option<png::Reader<&'s mut dyn Stream>>,

	start: u64,
	limit: usize,
	header: Option<Header>,
	palette: Vec<RGB8>,
	trns: Option<Transparency>,
	has_trns: bool,
	flags: u8,
}

impl Session for PngSession<'_> {
	fn read_info(&mut self) -> Result<Header, PngError> {
		if let Some(header) = self.header { return Ok(header); }

		let src = self.src.as_deref_mut().ok_or(PngError::Decode)?;
		let reader = decoder(src, self.limit, png::Transformations::IDENTITY)
			.read_info()
			.map_err(decode_error)?;
		let info = reader.info();

		let color = color_kind(info.color_type);
		let header = Header {
			width: info.width,
			height: info.height,
			bit_depth: info.bit_depth as u8,
			color,
			interlaced: info.interlaced,
		};

		let palette = info.palette.as_deref().map_or_else(Vec::new, |raw|
			raw.chunks_exact(3).map(|c| RGB8::new(c[0], c[1], c[2])).collect()
		);

		let trns = info.trns.as_deref().and_then(|raw| match color {
			ColorKind::Indexed => Some(Transparency::Palette(raw.to_vec())),
			ColorKind::Grey => key_samples(raw, 1)
				.map(|[g, _, _]| Transparency::Key(RGB16::new(g, g, g))),
			ColorKind::Rgb => key_samples(raw, 3)
				.map(|[r, g, b]| Transparency::Key(RGB16::new(r, g, b))),
			ColorKind::GreyAlpha | ColorKind::Rgba => None,
		});

		self.has_trns = info.trns.is_some();
		self.header = Some(header);
		self.palette = palette;
		self.trns = trns;

		Ok(header)
	}

	fn transparency(&self) -> Option<&Transparency> { self.trns.as_ref() }

	fn palette(&self) -> &[RGB8] { &self.palette }

	fn request(&mut self, flags: u8) {
		if self.reader.is_some() {
			log::warn!("PNG transforms requested after they were committed.");
			return;
		}
		log::trace!("Requesting PNG transforms {flags:04b}.");
		self.flags |= flags;
	}

	fn update_info(&mut self) -> Result<Header, PngError> {
		let raw = self.header.ok_or(PngError::Decode)?;

		if self.reader.is_none() {
			let src = self.src.take().ok_or(PngError::Decode)?;
			if ! src.seek_to(self.start) { return Err(PngError::Stream); }

			let engine = engine_flags(raw, self.flags, self.has_trns);
			let reader = decoder(src, self.limit, png_transformations(engine))
				.read_info()
				.map_err(decode_error)?;

			// The engine must land exactly where the residual plan starts.
			let expected = raw.transformed(engine, self.has_trns);
			let (color, depth) = reader.output_color_type();
			if color_kind(color) != expected.color || depth as u8 != expected.bit_depth {
				return Err(PngError::Decode);
			}

			self.reader = Some(reader);
		}

		let header = raw.transformed(self.flags, self.has_trns);
		log::trace!(
			"Transformed PNG header: {}x{}, {:?} at {} bits.",
			header.width,
			header.height,
			header.color,
			header.bit_depth,
		);
		Ok(header)
	}

	fn read_image(&mut self, rows: &mut RowTable<'_>) -> Result<(), PngError> {
		let raw = self.header.ok_or(PngError::Decode)?;
		let engine = engine_flags(raw, self.flags, self.has_trns);
		let plan = Plan::new(raw.transformed(engine, self.has_trns), self.flags & ! engine);

		let line = plan.line_len().ok_or(PngError::Overflow)?;
		let height = usize::try_from(plan.header().height)
			.map_err(|_| PngError::Overflow)?;
		if rows.len() != height || rows.row_len() != line {
			return Err(PngError::Decode);
		}

		// The destination counts against the limit too.
		let budget = self.limit.checked_sub(rows.buffer_len()).ok_or_else(|| {
			log::debug!("PNG bitmap exceeds the {}-byte memory limit.", self.limit);
			PngError::Decode
		})?;

		// The image can only be read once.
		let mut reader = self.reader.take().ok_or(PngError::Decode)?;

		if raw.interlaced { read_interlaced(&mut reader, &plan, rows, budget) }
		else {
			for r in 0..height {
				let row = reader.next_row().map_err(decode_error)?.ok_or(PngError::Decode)?;
				let dst = rows.row_mut(r).ok_or(PngError::Decode)?;
				plan.convert_row(row.data(), dst)?;
			}
			Ok(())
		}
	}
}



/// # Decoder.
///
/// Build a decoder capped at `limit` bytes with the given transformations.
fn decoder<R: Read>(src: R, limit: usize, transforms: png::Transformations)
-> png::Decoder<R> {
	let mut limits = png::Limits::default();
	limits.bytes = limit;

	let mut out = png::Decoder::new_with_limits(src, limits);
	out.set_transformations(transforms);
	out
}

/// # Read Interlaced.
///
/// Adam7 rows arrive pass by pass, so the engine has to assemble the whole
/// frame before any of it can be converted.
fn read_interlaced<R: Read>(
	reader: &mut png::Reader<R>,
	plan: &Plan,
	rows: &mut RowTable<'_>,
	budget: usize,
) -> Result<(), PngError> {
	let size = reader.output_buffer_size();
	if size > budget {
		log::debug!("Interlaced PNG frame ({size} bytes) exceeds the memory limit.");
		return Err(PngError::Decode);
	}

	let mut buf = Vec::new();
	buf.try_reserve_exact(size).map_err(|_| PngError::RowTableAlloc)?;
	buf.resize(size, 0);

	let out = reader.next_frame(&mut buf).map_err(decode_error)?;
	let stride = out.line_size;
	if stride == 0 { return Err(PngError::Decode); }

	for (r, src) in buf.chunks_exact(stride).take(rows.len()).enumerate() {
		let dst = rows.row_mut(r).ok_or(PngError::Decode)?;
		plan.convert_row(src, dst)?;
	}

	Ok(())
}

/// # Color Kind.
const fn color_kind(src: png::ColorType) -> ColorKind {
	match src {
		png::ColorType::Grayscale => ColorKind::Grey,
		png::ColorType::GrayscaleAlpha => ColorKind::GreyAlpha,
		png::ColorType::Indexed => ColorKind::Indexed,
		png::ColorType::Rgb => ColorKind::Rgb,
		png::ColorType::Rgba => ColorKind::Rgba,
	}
}

/// # Decode Error.
///
/// Note the engine's own explanation and collapse it to the generic error.
fn decode_error(err: png::DecodingError) -> PngError {
	log::debug!("PNG engine error: {err}");
	PngError::Decode
}

/// # Colour-Key Samples.
///
/// Parse the first `n` samples of a non-indexed `tRNS` chunk. Sixteen-bit
/// images store big-endian pairs; shallower ones may arrive either as pairs
/// or already narrowed to single bytes.
fn key_samples(raw: &[u8], n: usize) -> Option<[u16; 3]> {
	let mut out = [0_u16; 3];
	if raw.len() >= n * 2 {
		for (v, pair) in out.iter_mut().zip(raw.chunks_exact(2)).take(n) {
			*v = u16::from_be_bytes([pair[0], pair[1]]);
		}
	}
	else if raw.len() >= n {
		for (v, &b) in out.iter_mut().zip(raw).take(n) {
			*v = u16::from(b);
		}
	}
	else { return None; }
	Some(out)
}



#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		Bitmap,
		ByteOrder,
		ChannelMasks,
		fixtures,
		Binding,
	};
	use std::io::Cursor;

	#[test]
	fn t_key_samples() {
		assert_eq!(key_samples(&[0, 7], 1), Some([7, 0, 0]));
		assert_eq!(key_samples(&[7], 1), Some([7, 0, 0]));
		assert_eq!(key_samples(&[1, 2, 3, 4, 5, 6], 3), Some([0x0102, 0x0304, 0x0506]));
		assert_eq!(key_samples(&[1, 2, 3], 3), Some([1, 2, 3]));
		assert_eq!(key_samples(&[], 1), None);
		assert_eq!(key_samples(&[1, 2], 3), None);
	}

	#[test]
	fn t_session_info() {
		let raw = fixtures::encode(
			3, 1,
			png::ColorType::Indexed,
			png::BitDepth::Four,
			Some(&[10, 20, 30, 40, 50, 60]),
			Some(&[0]),
			&[0x01, 0x00],
		);

		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 1 << 20).unwrap();

		let header = session.read_info().unwrap();
		assert_eq!(header, Header {
			width: 3,
			height: 1,
			bit_depth: 4,
			color: ColorKind::Indexed,
			interlaced: false,
		});
		assert_eq!(session.palette(), [RGB8::new(10, 20, 30), RGB8::new(40, 50, 60)]);
		assert_eq!(session.transparency(), Some(&Transparency::Palette(vec![0])));

		// Reading again just returns the header.
		assert_eq!(session.read_info(), Ok(header));
	}

	#[test]
	fn t_session_key() {
		let raw = fixtures::encode(
			1, 1,
			png::ColorType::Rgb,
			png::BitDepth::Sixteen,
			None,
			Some(&[0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]),
			&[0; 6],
		);

		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 1 << 20).unwrap();
		session.read_info().unwrap();
		assert_eq!(
			session.transparency(),
			Some(&Transparency::Key(RGB16::new(0x1234, 0x5678, 0x9ABC))),
		);
		assert!(session.palette().is_empty());
	}

	#[test]
	fn t_session_order() {
		let raw = fixtures::encode(1, 1, png::ColorType::Grayscale, png::BitDepth::Eight, None, None, &[9]);
		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 1 << 20).unwrap();

		// Nothing works before the header has been read.
		assert_eq!(session.update_info(), Err(PngError::Decode));

		session.read_info().unwrap();
		let header = session.update_info().unwrap();
		let mut img = Bitmap::new(1, 1, 8, ChannelMasks::NONE, ByteOrder::Little).unwrap();

		{
			let mut rows = RowTable::new(&mut img).unwrap();
			assert_eq!(rows.row_len(), usize::from(header.pixel_depth() / 8));
			assert!(session.read_image(&mut rows).is_ok());

			// The image can only be read once.
			assert_eq!(session.read_image(&mut rows), Err(PngError::Decode));
		}

		assert_eq!(img.pixel(0, 0), Some(9));
	}

	#[test]
	fn t_session_engine_expand() {
		// A partially transparent palette expands engine-side.
		let raw = fixtures::encode(
			2, 1,
			png::ColorType::Indexed,
			png::BitDepth::Two,
			Some(&[10, 20, 30, 40, 50, 60]),
			Some(&[0, 128]),
			&[0b0100_0000],
		);

		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 1 << 20).unwrap();
		session.read_info().unwrap();
		session.request(crate::TRANSFORM_STRIP_16 | crate::TRANSFORM_PACKING | crate::TRANSFORM_EXPAND);

		let header = session.update_info().unwrap();
		assert_eq!((header.color, header.bit_depth), (ColorKind::Rgba, 8));

		// Late requests are ignored.
		session.request(crate::TRANSFORM_GRAY_TO_RGB);
		assert_eq!(session.update_info(), Ok(header));

		let masks = ChannelMasks::derive(ByteOrder::Big, 4);
		let mut img = Bitmap::new(2, 1, 32, masks, ByteOrder::Big).unwrap();
		{
			let mut rows = RowTable::new(&mut img).unwrap();
			session.read_image(&mut rows).unwrap();
		}
		assert_eq!(img.row(0), Some(&[40_u8, 50, 60, 128, 10, 20, 30, 0][..]));
	}

	#[test]
	fn t_session_limit() {
		let raw = fixtures::encode(64, 64, png::ColorType::Rgba, png::BitDepth::Eight, None, None, &[0; 64 * 64 * 4]);

		// Smaller than a single line.
		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw.clone());
		let mut session = engine.open(&mut src, 16).unwrap();
		assert_eq!(session.read_info(), Err(PngError::Decode));
		drop(session);

		// Room for the lines, but not the bitmap.
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 4096).unwrap();
		let res = session.read_info().and_then(|header| {
			let masks = ChannelMasks::derive(ByteOrder::Little, 4);
			let mut img = Bitmap::new(header.width, header.height, 32, masks, ByteOrder::Little)?;
			let mut rows = RowTable::new(&mut img)?;
			session.update_info()?;
			session.read_image(&mut rows)
		});
		assert_eq!(res, Err(PngError::Decode));
	}

	#[test]
	fn t_session_interlaced() {
		let data: Vec<u8> = (0..81_u8).map(|i| i * 3).collect();
		let raw = fixtures::encode_interlaced(9, 9, png::ColorType::Grayscale, 1, &data);

		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, 1 << 20).unwrap();
		assert!(session.read_info().unwrap().interlaced);
		session.request(crate::TRANSFORM_STRIP_16 | crate::TRANSFORM_PACKING);
		session.update_info().unwrap();

		let mut img = Bitmap::new(9, 9, 8, ChannelMasks::NONE, ByteOrder::Little).unwrap();
		{
			let mut rows = RowTable::new(&mut img).unwrap();
			session.read_image(&mut rows).unwrap();
		}
		for (y, expected) in data.chunks_exact(9).enumerate() {
			assert_eq!(img.row(y as u32), Some(expected));
		}
	}

	#[test]
	fn t_session_interlaced_limit() {
		// The bitmap fits, but not with a second frame alongside it.
		let data = vec![0_u8; 32 * 32 * 3];
		let raw = fixtures::encode_interlaced(32, 32, png::ColorType::Rgb, 3, &data);
		let limit = Bitmap::buffer_size(32, 32, 24).unwrap() + 1024;

		let engine = Binding::from(PngEngine);
		let mut src = Cursor::new(raw);
		let mut session = engine.open(&mut src, limit).unwrap();
		session.read_info().unwrap();
		session.request(crate::TRANSFORM_STRIP_16 | crate::TRANSFORM_PACKING);
		session.update_info().unwrap();

		let masks = ChannelMasks::derive(ByteOrder::Little, 3);
		let mut img = Bitmap::new(32, 32, 24, masks, ByteOrder::Little).unwrap();
		let mut rows = RowTable::new(&mut img).unwrap();
		assert_eq!(session.read_image(&mut rows), Err(PngError::Decode));
	}
}
