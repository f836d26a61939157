/*!
# `RWPNG` - Color Kind
*/



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # PNG Color Type.
///
/// This is the channel layout tag carried in a PNG header, either as stored
/// in the file or as it stands after the engine's transforms have been
/// applied.
pub enum ColorKind {
	/// # Greyscale.
	Grey,
	/// # Greyscale with Alpha.
	GreyAlpha,
	/// # Palette (Indexed).
	Indexed,
	/// # RGB.
	Rgb,
	/// # RGB with Alpha.
	Rgba,
}

/// # Getters.
impl ColorKind {
	#[inline]
	#[must_use]
	/// # Total Channels.
	///
	/// Return the number of samples stored per pixel. Palette indices count
	/// as one.
	pub const fn channels(self) -> u8 {
		match self {
			Self::Grey | Self::Indexed => 1,
			Self::GreyAlpha => 2,
			Self::Rgb => 3,
			Self::Rgba => 4,
		}
	}

	#[inline]
	#[must_use]
	/// # Is Greyscale?
	pub const fn is_greyscale(self) -> bool {
		matches!(self, Self::Grey | Self::GreyAlpha)
	}

	#[inline]
	#[must_use]
	/// # Is Indexed?
	pub const fn is_indexed(self) -> bool { matches!(self, Self::Indexed) }

	#[inline]
	#[must_use]
	/// # Has Alpha?
	///
	/// This is only true for layouts with a dedicated alpha channel; a
	/// palette or colour key may still carry transparency.
	pub const fn has_alpha(self) -> bool {
		matches!(self, Self::GreyAlpha | Self::Rgba)
	}
}
