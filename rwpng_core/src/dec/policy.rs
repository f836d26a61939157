/*!
# `RWPNG` - Transparency Policy
*/

use crate::{
	ColorKind,
	Header,
	Transparency,
};
use rgb::RGB8;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Colour Key.
pub enum Key {
	/// # Palette Index.
	Index(u8),

	/// # RGB Value (Eight Bits).
	Rgb(RGB8),
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Transparency Policy.
///
/// How an image's transparency will be carried over to the destination
/// bitmap.
pub enum Policy {
	/// # Fully Opaque.
	None,

	/// # Single Transparent Value.
	ColorKey(Key),

	/// # Full Alpha Channel.
	///
	/// The palette has to be expanded so that each pixel can carry its own
	/// alpha.
	FullAlpha,
}

impl Policy {
	#[must_use]
	/// # From Palette Alpha.
	///
	/// Classify a per-entry palette alpha list:
	/// * All entries opaque: [`Policy::None`];
	/// * Exactly one entry fully transparent, the rest opaque: a colour key
	///   for that index;
	/// * Anything else: [`Policy::FullAlpha`].
	pub fn from_alpha_table(alpha: &[u8]) -> Self {
		let mut key = None;
		for (idx, &a) in alpha.iter().enumerate() {
			match a {
				255 => {},
				0 if key.is_none() => { key = Some(idx); },
				_ => return Self::FullAlpha,
			}
		}

		match key {
			Some(idx) => u8::try_from(idx).map_or(Self::FullAlpha, |idx| Self::ColorKey(Key::Index(idx))),
			None => Self::None,
		}
	}

	#[must_use]
	/// # Inspect.
	///
	/// Work out the policy for an image given its raw (untransformed) header
	/// and transparency chunk, if any.
	///
	/// Named colours are reduced to eight bits per channel the same way the
	/// pixels will be: sixteen-bit samples keep their high byte and
	/// low-depth greys are stretched to the full range.
	pub fn inspect(header: Header, trns: Option<&Transparency>) -> Self {
		match (header.color, trns) {
			(ColorKind::Indexed, Some(Transparency::Palette(alpha))) =>
				Self::from_alpha_table(alpha),
			(ColorKind::Grey | ColorKind::Rgb, Some(Transparency::Key(c))) =>
				Self::ColorKey(Key::Rgb(RGB8::new(
					scale_sample(c.r, header.bit_depth),
					scale_sample(c.g, header.bit_depth),
					scale_sample(c.b, header.bit_depth),
				))),
			_ => Self::None,
		}
	}
}



#[allow(clippy::cast_possible_truncation)] // All branches fit.
/// # Scale Sample.
///
/// Bring a raw sample of the given depth to eight bits.
const fn scale_sample(v: u16, depth: u8) -> u8 {
	match depth {
		16 => (v >> 8) as u8,
		d @ 1..=7 => {
			let max = (1_u16 << d) - 1;
			let v = if v > max { max } else { v };
			(v * 255 / max) as u8
		},
		_ => v as u8,
	}
}
