/*!
# `RWPNG` - Palette
*/

use rgb::RGB8;
use std::ops::Deref;



/// # Maximum Palette Size.
pub const MAX_COLORS: usize = 256;



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Palette.
///
/// An ordered list of at most 256 colors. Paletted bitmaps store indices
/// into this list.
///
/// The colors can be accessed through `Deref` as an `&[RGB8]`.
pub struct Palette(Vec<RGB8>);

impl Deref for Palette {
	type Target = [RGB8];

	#[inline]
	fn deref(&self) -> &Self::Target { &self.0 }
}

impl Palette {
	#[must_use]
	/// # New (Black).
	///
	/// Create a palette of `len` black entries, clamped to 256.
	pub fn new(len: usize) -> Self {
		Self(vec![RGB8::new(0, 0, 0); len.min(MAX_COLORS)])
	}

	#[allow(clippy::cast_possible_truncation)] // It's 0..=255.
	#[must_use]
	/// # Linear Ramp.
	///
	/// The 256-entry greyscale palette where entry `i` is `(i, i, i)`.
	pub fn linear_ramp() -> Self {
		Self((0..MAX_COLORS).map(|i| {
			let v = i as u8;
			RGB8::new(v, v, v)
		}).collect())
	}

	/// # Copy From.
	///
	/// Replace the contents with (up to 256 of) the provided colors. The
	/// length follows the source.
	pub fn copy_from(&mut self, src: &[RGB8]) {
		self.0.clear();
		self.0.extend_from_slice(&src[..src.len().min(MAX_COLORS)]);
	}

	/// # Set Length.
	///
	/// Grow (with black) or shrink the palette, clamped to 256.
	pub fn set_len(&mut self, len: usize) {
		self.0.resize(len.min(MAX_COLORS), RGB8::new(0, 0, 0));
	}

	#[must_use]
	/// # Nearest.
	///
	/// Return the index of the entry closest to the given color, or `0` for
	/// an empty palette. Ties go to the lower index.
	pub fn nearest(&self, color: RGB8) -> usize {
		let mut best = 0;
		let mut best_dist = u32::MAX;
		for (idx, c) in self.0.iter().enumerate() {
			let dist = dist(c.r, color.r) + dist(c.g, color.g) + dist(c.b, color.b);
			if dist < best_dist {
				if dist == 0 { return idx; }
				best = idx;
				best_dist = dist;
			}
		}
		best
	}
}



/// # Squared Channel Distance.
const fn dist(a: u8, b: u8) -> u32 {
	let d = a.abs_diff(b) as u32;
	d * d
}
