/*!
# `RWPNG` - Error
*/

use std::{
	error::Error,
	fmt,
};



#[derive(Debug, Copy, Clone, Eq, PartialEq)]
/// # Errors.
///
/// Every failure is recoverable from the caller's point of view. When one of
/// these comes back from [`Loader::load`](crate::Loader::load), no bitmap was
/// produced and the stream has been rewound to where it started.
pub enum PngError {
	/// # No decompression engine is bound.
	BindingUnavailable,

	/// # Unsupported pixel layout.
	Color,

	/// # The engine could not decode the stream.
	Decode,

	/// # The engine could not allocate its info record.
	InfoAlloc,

	/// # The destination bitmap could not be allocated.
	BitmapAlloc,

	/// # Image dimensions are out of range.
	Overflow,

	/// # The row table could not be allocated.
	RowTableAlloc,

	/// # The engine could not allocate its session.
	SessionAlloc,

	/// # The stream could not report or restore its position.
	Stream,
}

impl Error for PngError {}

impl AsRef<str> for PngError {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for PngError {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl PngError {
	#[must_use]
	/// # As Str.
	///
	/// Return the error as an English string slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::BindingUnavailable => "PNG images are not supported",
			Self::Color => "Unsupported color encoding format.",
			Self::Decode => "Error reading the PNG file.",
			Self::InfoAlloc => "Couldn't create image information for PNG file",
			Self::BitmapAlloc | Self::RowTableAlloc => "Out of memory",
			Self::Overflow => "The image dimensions are out of range.",
			Self::SessionAlloc => "Couldn't allocate memory for PNG file or incompatible PNG dll",
			Self::Stream => "Unable to seek within the PNG stream.",
		}
	}
}



#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn t_messages() {
		// The two allocation failures share the host's wording.
		assert_eq!(PngError::BitmapAlloc.as_str(), "Out of memory");
		assert_eq!(PngError::RowTableAlloc.as_str(), PngError::BitmapAlloc.as_str());

		// Display and AsRef agree with as_str.
		for e in [
			PngError::BindingUnavailable,
			PngError::Color,
			PngError::Decode,
			PngError::InfoAlloc,
			PngError::BitmapAlloc,
			PngError::Overflow,
			PngError::RowTableAlloc,
			PngError::SessionAlloc,
			PngError::Stream,
		] {
			assert!(! e.as_str().is_empty());
			assert_eq!(e.to_string(), e.as_str());
			assert_eq!(e.as_ref(), e.as_str());
		}
	}
}
