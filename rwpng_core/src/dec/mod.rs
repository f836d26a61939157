/*!
# `RWPNG` - Decoding!
*/

pub(super) mod policy;

use crate::{
	Binding,
	Bitmap,
	ByteOrder,
	ChannelMasks,
	ColorKind,
	Key,
	Palette,
	PngError,
	Policy,
	RowTable,
	Stream,
	TRANSFORM_EXPAND,
	TRANSFORM_GRAY_TO_RGB,
	TRANSFORM_PACKING,
	TRANSFORM_STRIP_16,
};
use std::fmt;



/// # Default Memory Limit (64 MiB).
const DEFAULT_LIMIT: usize = 64 * 1024 * 1024;



#[derive(Clone)]
/// # Loader.
///
/// This drives a decompression engine through a single decode, then maps the
/// result onto a [`Bitmap`]: depth and channel masks follow the transformed
/// header, greyscale images get a linear palette, indexed images get theirs,
/// and transparency becomes either a colour key or a full alpha channel.
///
/// ## Examples
///
/// ```no_run
/// use rwpng_core::{Loader, Registry};
/// use std::fs::File;
///
/// Registry::global().acquire().unwrap();
/// let binding = Registry::global().binding().unwrap();
///
/// let mut file = File::open("image.png").unwrap();
/// let img = Loader::new(binding).load(&mut file).unwrap();
/// println!("{}x{} at {} bits.", img.width(), img.height(), img.depth());
///
/// Registry::global().release();
/// ```
pub struct Loader {
	binding: Binding,
	order: ByteOrder,
	limit: usize,
}

impl fmt::Debug for Loader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Loader")
			.field("order", &self.order)
			.field("limit", &self.limit)
			.finish_non_exhaustive()
	}
}

impl From<Binding> for Loader {
	#[inline]
	fn from(src: Binding) -> Self { Self::new(src) }
}

/// ## Setup.
impl Loader {
	#[must_use]
	/// # New.
	///
	/// Create a loader for the engine, using native byte order and a 64 MiB
	/// memory limit.
	pub const fn new(binding: Binding) -> Self {
		Self {
			binding,
			order: ByteOrder::NATIVE,
			limit: DEFAULT_LIMIT,
		}
	}

	#[must_use]
	/// # With Byte Order.
	///
	/// Derive channel masks for the given byte order instead of the host's.
	pub const fn with_byte_order(mut self, order: ByteOrder) -> Self {
		self.order = order;
		self
	}

	#[must_use]
	/// # With Memory Limit.
	///
	/// Cap the memory a decode may use, in bytes, destination bitmap
	/// included. Images requiring more fail to decode.
	pub const fn with_limit(mut self, limit: usize) -> Self {
		self.limit = limit;
		self
	}

	#[must_use]
	/// # Byte Order.
	pub const fn byte_order(&self) -> ByteOrder { self.order }

	#[must_use]
	/// # Memory Limit.
	pub const fn limit(&self) -> usize { self.limit }
}

/// ## Loading.
impl Loader {
	/// # Load.
	///
	/// Decode a PNG from the stream's current position.
	///
	/// On success, the stream is left wherever the engine stopped reading.
	/// On failure, it is rewound to where it started so that something else
	/// can have a go.
	///
	/// ## Errors
	///
	/// Returns an error if the stream cannot report its position, or if any
	/// stage of the decode fails.
	pub fn load<S: Stream>(&self, src: &mut S) -> Result<Bitmap, PngError> {
		let start = src.tell().ok_or(PngError::Stream)?;

		match self.decode(&mut *src) {
			Ok(img) => Ok(img),
			Err(e) => {
				log::debug!("PNG decode failed: {e}");
				if ! src.seek_to(start) {
					log::warn!("Unable to rewind the stream after a failed PNG decode.");
				}
				Err(e)
			},
		}
	}

	/// # Decode.
	///
	/// The session lives exactly as long as this call; it is dropped on every
	/// return path.
	fn decode(&self, src: &mut dyn Stream) -> Result<Bitmap, PngError> {
		let mut session = self.binding.open(src, self.limit)?;

		let raw = session.read_info()?;
		log::debug!(
			"Decoding {}x{} PNG: {:?} at {} bits{}.",
			raw.width,
			raw.height,
			raw.color,
			raw.bit_depth,
			if raw.interlaced { ", interlaced" } else { "" },
		);

		// Always byte-sized samples, never more than eight bits.
		let mut flags = TRANSFORM_STRIP_16 | TRANSFORM_PACKING;
		if matches!(raw.color, ColorKind::Grey) { flags |= TRANSFORM_EXPAND; }

		let policy = Policy::inspect(raw, session.transparency());
		if matches!(policy, Policy::FullAlpha) { flags |= TRANSFORM_EXPAND; }

		if matches!(raw.color, ColorKind::GreyAlpha) { flags |= TRANSFORM_GRAY_TO_RGB; }

		session.request(flags);
		let header = session.update_info()?;

		let masks =
			if header.color.is_indexed() { ChannelMasks::NONE }
			else { ChannelMasks::derive(self.order, header.channels()) };

		// The bitmap counts against the memory limit.
		let size = Bitmap::buffer_size(header.width, header.height, header.pixel_depth())?;
		if size > self.limit {
			log::debug!("A {size}-byte bitmap exceeds the {}-byte memory limit.", self.limit);
			return Err(PngError::Decode);
		}

		let mut img = Bitmap::new(
			header.width,
			header.height,
			header.pixel_depth(),
			masks,
			self.order,
		)?;

		{
			let mut rows = RowTable::new(&mut img)?;
			session.read_image(&mut rows)?;
		}

		// Paletted destinations need their colours.
		if let Some(pal) = img.palette_mut() {
			if matches!(raw.color, ColorKind::Grey) { *pal = Palette::linear_ramp(); }
			else if ! session.palette().is_empty() { pal.copy_from(session.palette()); }
		}

		// Grey keys index the ramp, so the palette has to be in place first.
		match policy {
			Policy::ColorKey(Key::Index(idx)) => { img.set_color_key(Some(u32::from(idx))); },
			Policy::ColorKey(Key::Rgb(c)) => {
				let key = img.map_rgb(c);
				img.set_color_key(Some(key));
			},
			Policy::None | Policy::FullAlpha => {},
		}

		drop(session);

		log::debug!(
			"Decoded {}x{} PNG into a {}-bit bitmap ({:?}).",
			img.width(),
			img.height(),
			img.depth(),
			policy,
		);

		Ok(img)
	}
}
