/*!
# `RWPNG` - Row Table
*/

use crate::{
	Bitmap,
	PngError,
};



#[derive(Debug)]
/// # Row Table.
///
/// A bounds-checked view over a [`Bitmap`]'s rows, handed to the engine so it
/// can write decoded scanlines straight into the destination.
///
/// Each row slice covers exactly `width * bytes_per_pixel` bytes; row padding
/// is never exposed.
pub struct RowTable<'a> {
	buf: &'a mut [u8],
	starts: Vec<usize>,
	len: usize,
}

impl<'a> RowTable<'a> {
	/// # New.
	///
	/// Build the table of row offsets for the bitmap.
	///
	/// ## Errors
	///
	/// This will return an error if the table cannot be allocated.
	pub fn new(img: &'a mut Bitmap) -> Result<Self, PngError> {
		let height = usize::try_from(img.height()).map_err(|_| PngError::Overflow)?;
		let width = usize::try_from(img.width()).map_err(|_| PngError::Overflow)?;
		let len = width * img.bytes_per_pixel();
		let pitch = img.pitch();

		let mut starts = Vec::new();
		starts.try_reserve_exact(height).map_err(|_| PngError::RowTableAlloc)?;
		starts.extend((0..height).map(|r| r * pitch));

		Ok(Self {
			buf: img.pixels_mut(),
			starts,
			len,
		})
	}

	#[must_use]
	/// # Number of Rows.
	pub fn len(&self) -> usize { self.starts.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.starts.is_empty() }

	#[must_use]
	/// # Row Length.
	///
	/// Return the number of bytes in each row slice.
	pub const fn row_len(&self) -> usize { self.len }

	#[must_use]
	/// # Buffer Length.
	///
	/// Return the size of the whole destination buffer, padding included.
	pub(crate) fn buffer_len(&self) -> usize { self.buf.len() }

	/// # Row (Mutable).
	///
	/// Return row `r`, or `None` if it is out of range.
	pub fn row_mut(&mut self, r: usize) -> Option<&mut [u8]> {
		let start = *self.starts.get(r)?;
		self.buf.get_mut(start..start + self.len)
	}
}
