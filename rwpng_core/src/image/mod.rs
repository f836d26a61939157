/*!
# `RWPNG` - Bitmap Business
*/

pub(super) mod color;
pub(super) mod mask;
pub(super) mod palette;
pub(super) mod rows;

use crate::{
	ByteOrder,
	ChannelMasks,
	Palette,
	PngError,
};
use rgb::RGB8;
use std::{
	num::NonZeroU32,
	ops::Deref,
};



/// # Row Alignment.
///
/// Row strides are padded out to a multiple of this many bytes.
const ROW_ALIGN: usize = 4;



#[derive(Debug, Clone)]
/// # Bitmap.
///
/// An uncompressed, row-major pixel buffer along with everything needed to
/// interpret it: depth, channel masks, an optional palette, and an optional
/// transparent colour key.
///
/// Each row occupies [`Bitmap::pitch`] bytes, the first
/// `width * bytes_per_pixel` of which hold pixels; any padding is zeroed.
///
/// The underlying buffer can be accessed through `Deref` as an `&[u8]`.
pub struct Bitmap {
	pixels: Vec<u8>,
	width: NonZeroU32,
	height: NonZeroU32,
	depth: u8,
	pitch: usize,
	masks: ChannelMasks,
	order: ByteOrder,
	palette: Option<Palette>,
	color_key: Option<u32>,
}

impl Deref for Bitmap {
	type Target = [u8];

	#[inline]
	fn deref(&self) -> &Self::Target { &self.pixels }
}

/// ## Instantiation.
impl Bitmap {
	/// # New.
	///
	/// Allocate a zeroed bitmap. `depth` is in bits per pixel and must be a
	/// whole number of bytes between one and four. Depths of eight or less
	/// come with a palette slot of `2^depth` black entries.
	///
	/// ## Errors
	///
	/// This will return an error if the dimensions are zero or overflow, the
	/// depth is unsupported, or the buffer cannot be allocated.
	pub fn new(
		width: u32,
		height: u32,
		depth: u8,
		masks: ChannelMasks,
		order: ByteOrder,
	) -> Result<Self, PngError> {
		let (pitch, size) = layout(width, height, depth)?;
		let width = NonZeroU32::new(width).ok_or(PngError::Overflow)?;
		let height = NonZeroU32::new(height).ok_or(PngError::Overflow)?;

		let mut pixels = Vec::new();
		pixels.try_reserve_exact(size).map_err(|_| PngError::BitmapAlloc)?;
		pixels.resize(size, 0);

		let palette =
			if depth <= 8 { Some(Palette::new(1_usize << depth)) }
			else { None };

		Ok(Self {
			pixels,
			width,
			height,
			depth,
			pitch,
			masks,
			order,
			palette,
			color_key: None,
		})
	}

	/// # Buffer Size.
	///
	/// Return the number of bytes [`Bitmap::new`] would allocate for the
	/// pixels of an image with these dimensions, without allocating them.
	///
	/// ## Errors
	///
	/// This will return the same errors as [`Bitmap::new`] for zero or
	/// overflowing dimensions and unsupported depths.
	pub fn buffer_size(width: u32, height: u32, depth: u8) -> Result<usize, PngError> {
		layout(width, height, depth).map(|(_, size)| size)
	}
}

/// ## Getters.
impl Bitmap {
	#[must_use]
	/// # Bytes Per Pixel.
	pub const fn bytes_per_pixel(&self) -> usize { (self.depth / 8) as usize }

	#[must_use]
	/// # Byte Order.
	pub const fn byte_order(&self) -> ByteOrder { self.order }

	#[must_use]
	/// # Color Key.
	///
	/// Return the transparent pixel value, if one is active. For paletted
	/// bitmaps this is a palette index.
	pub const fn color_key(&self) -> Option<u32> { self.color_key }

	#[must_use]
	/// # Depth.
	///
	/// Return the number of bits per pixel.
	pub const fn depth(&self) -> u8 { self.depth }

	#[must_use]
	/// # Height.
	pub const fn height(&self) -> u32 { self.height.get() }

	#[must_use]
	/// # Channel Masks.
	pub const fn masks(&self) -> ChannelMasks { self.masks }

	#[must_use]
	/// # Palette.
	pub const fn palette(&self) -> Option<&Palette> { self.palette.as_ref() }

	#[must_use]
	/// # Pitch.
	///
	/// Return the row stride in bytes.
	pub const fn pitch(&self) -> usize { self.pitch }

	#[must_use]
	/// # Width.
	pub const fn width(&self) -> u32 { self.width.get() }

	#[must_use]
	/// # Row.
	///
	/// Return the pixel bytes of row `y`, minus any padding.
	pub fn row(&self, y: u32) -> Option<&[u8]> {
		if y < self.height() {
			let start = usize::try_from(y).ok()?.checked_mul(self.pitch)?;
			let len = self.bytes_per_pixel() * usize::try_from(self.width()).ok()?;
			self.pixels.get(start..start + len)
		}
		else { None }
	}

	#[must_use]
	/// # Pixel.
	///
	/// Read the packed value of the pixel at `(x, y)`, interpreting its bytes
	/// with the bitmap's byte order. For paletted bitmaps this is the index.
	pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
		if x >= self.width() { return None; }
		let bpp = self.bytes_per_pixel();
		let start = usize::try_from(x).ok()?.checked_mul(bpp)?;
		let px = self.row(y)?.get(start..start + bpp)?;

		let mut out = 0_u32;
		match self.order {
			ByteOrder::Little => for &b in px.iter().rev() {
				out = (out << 8) | u32::from(b);
			},
			ByteOrder::Big => for &b in px {
				out = (out << 8) | u32::from(b);
			},
		}
		Some(out)
	}
}

/// ## Setters.
impl Bitmap {
	/// # Palette (Mutable).
	pub fn palette_mut(&mut self) -> Option<&mut Palette> { self.palette.as_mut() }

	/// # Set Color Key.
	///
	/// Enable (`Some`) or disable (`None`) single-value transparency.
	pub fn set_color_key(&mut self, key: Option<u32>) { self.color_key = key; }

	/// # Pixel Buffer (Mutable).
	pub(crate) fn pixels_mut(&mut self) -> &mut [u8] { &mut self.pixels }
}

/// ## Color Mapping.
impl Bitmap {
	#[must_use]
	/// # Map RGB.
	///
	/// Return this bitmap's native encoding of an opaque colour: the packed
	/// value for true-colour bitmaps, or the nearest palette index for
	/// paletted ones.
	pub fn map_rgb(&self, color: RGB8) -> u32 {
		match &self.palette {
			Some(p) => u32::try_from(p.nearest(color)).unwrap_or(0),
			None => self.masks.pack(color.r, color.g, color.b),
		}
	}
}



/// # Layout.
///
/// Return the padded pitch and total buffer size for a bitmap.
fn layout(width: u32, height: u32, depth: u8) -> Result<(usize, usize), PngError> {
	if depth == 0 || depth % 8 != 0 || depth > 32 {
		return Err(PngError::Color);
	}
	if width == 0 || height == 0 { return Err(PngError::Overflow); }

	let line = usize::try_from(width).ok()
		.and_then(|w| w.checked_mul(usize::from(depth / 8)))
		.ok_or(PngError::Overflow)?;
	let pitch = line.checked_next_multiple_of(ROW_ALIGN)
		.ok_or(PngError::Overflow)?;
	let size = usize::try_from(height).ok()
		.and_then(|h| h.checked_mul(pitch))
		.ok_or(PngError::Overflow)?;

	Ok((pitch, size))
}
