/*!
# `RWPNG` - Decompression Engine
*/

#[cfg(feature = "png")] pub(super) mod png;
pub(super) mod registry;
#[cfg(feature = "png")] mod transform;

use crate::{
	ColorKind,
	PngError,
	RowTable,
	Stream,
	TRANSFORM_EXPAND,
	TRANSFORM_GRAY_TO_RGB,
	TRANSFORM_PACKING,
	TRANSFORM_STRIP_16,
};
use rgb::{
	RGB16,
	RGB8,
};
use std::{
	fmt,
	sync::Arc,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Header.
///
/// The `IHDR` fields that matter for decoding, either as stored in the file
/// or as they stand once the requested transforms are applied.
pub struct Header {
	/// # Width (Pixels).
	pub width: u32,

	/// # Height (Pixels).
	pub height: u32,

	/// # Bits Per Sample.
	pub bit_depth: u8,

	/// # Color Type.
	pub color: ColorKind,

	/// # Interlaced?
	pub interlaced: bool,
}

impl Header {
	#[inline]
	#[must_use]
	/// # Channels.
	pub const fn channels(&self) -> u8 { self.color.channels() }

	#[inline]
	#[must_use]
	/// # Pixel Depth.
	///
	/// Return the number of bits used by each pixel.
	pub const fn pixel_depth(&self) -> u8 { self.bit_depth * self.channels() }

	#[must_use]
	/// # Transformed.
	///
	/// Return the header as it will read after the `TRANSFORM_*` flags have
	/// been applied. `trns` indicates whether the image carries a
	/// transparency chunk; it decides whether an expanded palette gains an
	/// alpha channel.
	pub const fn transformed(self, flags: u8, trns: bool) -> Self {
		let mut out = self;

		if self.bit_depth == 16 && 0 != flags & TRANSFORM_STRIP_16 {
			out.bit_depth = 8;
		}

		if self.bit_depth < 8 && 0 != flags & (TRANSFORM_PACKING | TRANSFORM_EXPAND) {
			out.bit_depth = 8;
		}

		if 0 != flags & TRANSFORM_EXPAND && matches!(self.color, ColorKind::Indexed) {
			out.color = if trns { ColorKind::Rgba } else { ColorKind::Rgb };
			out.bit_depth = 8;
		}

		if 0 != flags & TRANSFORM_GRAY_TO_RGB {
			out.color = match out.color {
				ColorKind::Grey => ColorKind::Rgb,
				ColorKind::GreyAlpha => ColorKind::Rgba,
				c => c,
			};
		}

		out
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Transparency Chunk.
pub enum Transparency {
	/// # Per-Entry Palette Alpha.
	///
	/// Entries beyond the end of the list are opaque.
	Palette(Vec<u8>),

	/// # Transparent Color.
	///
	/// Samples are at the image's original bit depth; greyscale images repeat
	/// the grey value across all three.
	Key(RGB16),
}



/// # Decode Session.
///
/// The per-call state of a decompression engine, bound to exactly one
/// stream. Dropping the session releases it.
///
/// The methods are called in this order: [`Session::read_info`], any number
/// of [`Session::request`]s, [`Session::update_info`], then
/// [`Session::read_image`].
pub trait Session {
	/// # Read Info.
	///
	/// Read the header (and any palette/transparency chunks preceding the
	/// image data).
	///
	/// ## Errors
	///
	/// Return any errors encountered while parsing.
	fn read_info(&mut self) -> Result<Header, PngError>;

	/// # Transparency.
	///
	/// Return the transparency chunk, if the image has one.
	fn transparency(&self) -> Option<&Transparency>;

	/// # Palette.
	///
	/// Return the palette, if any; this is empty for most color types.
	fn palette(&self) -> &[RGB8];

	/// # Request Transforms.
	///
	/// Add `TRANSFORM_*` flags to the pending set. Engines may ignore
	/// requests made after [`Session::update_info`].
	fn request(&mut self, flags: u8);

	/// # Update Info.
	///
	/// Commit the pending transforms and return the resulting header.
	///
	/// ## Errors
	///
	/// Return an error if the transforms cannot be applied.
	fn update_info(&mut self) -> Result<Header, PngError>;

	/// # Read Image.
	///
	/// Decode the whole image, writing one transformed scanline into each
	/// row of the table.
	///
	/// ## Errors
	///
	/// Return any errors encountered while decoding, including a table whose
	/// shape doesn't match the transformed header.
	fn read_image(&mut self, rows: &mut RowTable<'_>) -> Result<(), PngError>;
}



/// # Decompression Engine.
///
/// A factory for [`Session`]s.
pub trait Engine: Send + Sync {
	/// # Open.
	///
	/// Create a session that pulls its bytes from `src`. `limit` caps the
	/// memory the engine may use while decoding.
	///
	/// ## Errors
	///
	/// Return an error if the session state cannot be allocated.
	fn open<'s>(&self, src: &'s mut dyn Stream, limit: usize)
	-> Result<Box<dyn Session + 's>, PngError>;
}



#[derive(Clone)]
/// # Engine Binding.
///
/// A shared handle to an initialized [`Engine`], as handed out by a
/// [`Registry`](crate::Registry) or built directly around any engine.
pub struct Binding(Arc<dyn Engine>);

impl fmt::Debug for Binding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Binding").finish_non_exhaustive()
	}
}

impl<E: Engine + 'static> From<E> for Binding {
	#[inline]
	fn from(src: E) -> Self { Self(Arc::new(src)) }
}

impl From<Arc<dyn Engine>> for Binding {
	#[inline]
	fn from(src: Arc<dyn Engine>) -> Self { Self(src) }
}

impl Binding {
	#[inline]
	/// # Open Session.
	///
	/// ## Errors
	///
	/// Bubbles up the engine's session creation errors.
	pub fn open<'s>(&self, src: &'s mut dyn Stream, limit: usize)
	-> Result<Box<dyn Session + 's>, PngError> {
		self.0.open(src, limit)
	}
}
