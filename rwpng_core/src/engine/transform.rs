/*!
# `RWPNG` - Scanline Transforms

The `png` crate strips sixteen-bit samples and expands palettes on its own,
but it cannot unpack indices without expanding them, stretch a keyed grey
without turning the key into alpha, or copy grey into RGB. Whatever is left
over after the engine-side transforms is applied here, one scanline at a
time.
*/

use super::Header;
use crate::{
	ColorKind,
	PngError,
	TRANSFORM_EXPAND,
	TRANSFORM_GRAY_TO_RGB,
	TRANSFORM_STRIP_16,
};



/// # Engine-Side Flags.
///
/// Return the subset of `flags` the `png` crate can apply itself: sixteen-bit
/// stripping always, expansion only for palettes and for greys with no
/// colour key to preserve.
pub(super) const fn engine_flags(header: Header, flags: u8, trns: bool) -> u8 {
	let mut out = flags & TRANSFORM_STRIP_16;
	if 0 != flags & TRANSFORM_EXPAND {
		match header.color {
			ColorKind::Indexed => { out |= TRANSFORM_EXPAND; },
			ColorKind::Grey if ! trns => { out |= TRANSFORM_EXPAND; },
			_ => {},
		}
	}
	out
}

/// # `png` Transformations.
pub(super) fn png_transformations(flags: u8) -> png::Transformations {
	let mut out = png::Transformations::IDENTITY;
	if 0 != flags & TRANSFORM_STRIP_16 { out |= png::Transformations::STRIP_16; }
	if 0 != flags & TRANSFORM_EXPAND { out |= png::Transformations::EXPAND; }
	out
}



/// # Transform Plan.
///
/// Turn the engine's scanlines into the fully transformed layout.
pub(super) struct Plan {
	src: Header,
	dst: Header,
	flags: u8,
}

impl Plan {
	/// # New.
	///
	/// `src` is the layout the engine produces and `flags` the transforms it
	/// left undone. Palette expansion is never among them.
	pub(super) const fn new(src: Header, flags: u8) -> Self {
		Self {
			src,
			dst: src.transformed(flags, false),
			flags,
		}
	}

	/// # Output Header.
	pub(super) const fn header(&self) -> Header { self.dst }

	/// # Output Line Length.
	///
	/// Return the number of bytes in one transformed scanline.
	pub(super) fn line_len(&self) -> Option<usize> {
		usize::try_from(self.dst.width).ok()?
			.checked_mul(usize::from(self.dst.pixel_depth()))?
			.checked_add(7)
			.map(|n| n / 8)
	}

	/// # Convert Row.
	///
	/// Transform one engine scanline into `dst`, which must be exactly
	/// [`Plan::line_len`] bytes long.
	///
	/// ## Errors
	///
	/// Returns an error if either buffer is too short.
	pub(super) fn convert_row(&self, src: &[u8], dst: &mut [u8]) -> Result<(), PngError> {
		if Some(dst.len()) != self.line_len() { return Err(PngError::Decode); }

		// Same layout in and out; just copy.
		if self.src.color == self.dst.color && self.src.bit_depth == self.dst.bit_depth {
			let src = src.get(..dst.len()).ok_or(PngError::Decode)?;
			dst.copy_from_slice(src);
			return Ok(());
		}

		let channels = usize::from(self.src.channels());
		let scale = 0 != self.flags & TRANSFORM_EXPAND;
		let gray_to_rgb = 0 != self.flags & TRANSFORM_GRAY_TO_RGB;

		let mut samples = Samples::new(src, self.src.bit_depth);
		let mut out = Writer::new(dst, self.dst.bit_depth == 16);
		let mut px = [0_u16; 4];

		for _ in 0..self.dst.width {
			for v in px.iter_mut().take(channels) {
				*v = samples.next().ok_or(PngError::Decode)?;
			}

			if self.src.color.is_greyscale() {
				let g = self.sample(px[0], scale);
				out.push(g)?;
				if gray_to_rgb {
					out.push(g)?;
					out.push(g)?;
				}
				if self.src.color.has_alpha() {
					out.push(self.sample(px[1], scale))?;
				}
			}
			else {
				for &v in &px[..channels] { out.push(v)?; }
			}
		}

		Ok(())
	}

	/// # Output Sample.
	///
	/// Sub-byte samples are stretched to the full byte range when `scale` is
	/// set and kept as-is otherwise.
	const fn sample(&self, v: u16, scale: bool) -> u16 {
		match self.src.bit_depth {
			d @ 1..=7 if scale => v * 255 / ((1 << d) - 1),
			_ => v,
		}
	}
}



/// # Sample Iterator.
///
/// Yield the samples of a scanline, MSB-first for packed depths and
/// big-endian for sixteen-bit ones.
struct Samples<'a> {
	buf: &'a [u8],
	depth: u8,
	pos: usize,
}

impl<'a> Samples<'a> {
	/// # New.
	const fn new(buf: &'a [u8], depth: u8) -> Self {
		Self { buf, depth, pos: 0 }
	}
}

impl Iterator for Samples<'_> {
	type Item = u16;

	fn next(&mut self) -> Option<Self::Item> {
		let out = match self.depth {
			16 => {
				let idx = self.pos * 2;
				u16::from_be_bytes([*self.buf.get(idx)?, *self.buf.get(idx + 1)?])
			},
			8 => u16::from(*self.buf.get(self.pos)?),
			d => {
				let d = usize::from(d);
				let bit = self.pos * d;
				let byte = *self.buf.get(bit / 8)?;
				let shift = 8 - d - bit % 8;
				let mask = (1_u8 << d) - 1;
				u16::from((byte >> shift) & mask)
			},
		};

		self.pos += 1;
		Some(out)
	}
}



/// # Scanline Writer.
struct Writer<'a> {
	buf: &'a mut [u8],
	pos: usize,
	wide: bool,
}

impl<'a> Writer<'a> {
	/// # New.
	fn new(buf: &'a mut [u8], wide: bool) -> Self {
		Self { buf, pos: 0, wide }
	}

	#[allow(clippy::cast_possible_truncation)] // Narrow samples fit.
	/// # Push Sample.
	fn push(&mut self, v: u16) -> Result<(), PngError> {
		if self.wide {
			let [hi, lo] = v.to_be_bytes();
			self.push8(hi)?;
			self.push8(lo)
		}
		else { self.push8(v as u8) }
	}

	/// # Push Byte.
	fn push8(&mut self, v: u8) -> Result<(), PngError> {
		let slot = self.buf.get_mut(self.pos).ok_or(PngError::Decode)?;
		*slot = v;
		self.pos += 1;
		Ok(())
	}
}
