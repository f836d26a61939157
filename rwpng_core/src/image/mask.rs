/*!
# `RWPNG` - Channel Masks
*/



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Byte Order.
///
/// Pixels are always written to memory as `R, G, B[, A]` bytes. The byte
/// order decides how those bytes read back as a packed `u32`, and so which
/// bits each channel mask covers.
pub enum ByteOrder {
	/// # Little Endian.
	Little,
	/// # Big Endian.
	Big,
}

impl Default for ByteOrder {
	#[inline]
	fn default() -> Self { Self::NATIVE }
}

impl ByteOrder {
	/// # Host Byte Order.
	pub const NATIVE: Self =
		if cfg!(target_endian = "big") { Self::Big }
		else { Self::Little };
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Channel Masks.
///
/// The bits of a packed pixel value belonging to each channel. Absent
/// channels are zero; paletted bitmaps have no masks at all.
pub struct ChannelMasks {
	/// # Red.
	pub red: u32,
	/// # Green.
	pub green: u32,
	/// # Blue.
	pub blue: u32,
	/// # Alpha.
	pub alpha: u32,
}

impl ChannelMasks {
	/// # No Masks.
	pub const NONE: Self = Self { red: 0, green: 0, blue: 0, alpha: 0 };

	#[must_use]
	/// # Derive.
	///
	/// Work out the masks for a byte-per-channel RGB (`channels == 3`) or
	/// RGBA (`channels == 4`) layout. Anything narrower is paletted and gets
	/// [`ChannelMasks::NONE`].
	pub const fn derive(order: ByteOrder, channels: u8) -> Self {
		if channels < 3 { return Self::NONE; }
		let alpha = channels == 4;

		match order {
			ByteOrder::Little => Self {
				red: 0x0000_00FF,
				green: 0x0000_FF00,
				blue: 0x00FF_0000,
				alpha: if alpha { 0xFF00_0000 } else { 0 },
			},
			ByteOrder::Big => {
				let shift = if alpha { 0 } else { 8 };
				Self {
					red: 0xFF00_0000 >> shift,
					green: 0x00FF_0000 >> shift,
					blue: 0x0000_FF00 >> shift,
					alpha: 0x0000_00FF >> shift,
				}
			},
		}
	}

	#[must_use]
	/// # Is Empty?
	pub const fn is_empty(&self) -> bool {
		self.red == 0 && self.green == 0 && self.blue == 0 && self.alpha == 0
	}

	#[must_use]
	/// # Pack.
	///
	/// Encode an opaque colour: each channel is shifted into its mask and the
	/// whole alpha mask, if any, is set.
	pub const fn pack(&self, r: u8, g: u8, b: u8) -> u32 {
		place(r, self.red) | place(g, self.green) | place(b, self.blue) | self.alpha
	}

	#[must_use]
	/// # Unpack.
	///
	/// Pull the `(r, g, b, a)` channels back out of a packed value. A missing
	/// alpha channel reads as fully opaque.
	pub const fn unpack(&self, px: u32) -> (u8, u8, u8, u8) {
		(
			take(px, self.red),
			take(px, self.green),
			take(px, self.blue),
			if self.alpha == 0 { 255 } else { take(px, self.alpha) },
		)
	}
}



/// # Shift a Channel Into Its Mask.
const fn place(v: u8, mask: u32) -> u32 {
	if mask == 0 { 0 }
	else { ((v as u32) << mask.trailing_zeros()) & mask }
}

#[allow(clippy::cast_possible_truncation)] // Masks are eight bits wide.
/// # Shift a Channel Out of Its Mask.
const fn take(px: u32, mask: u32) -> u8 {
	if mask == 0 { 0 }
	else { ((px & mask) >> mask.trailing_zeros()) as u8 }
}
