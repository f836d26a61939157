/*!
# `RWPNG` - Streams
*/

use std::io::{
	Read,
	Seek,
	SeekFrom,
};



/// # Byte Stream.
///
/// A positioned, seekable byte source. Anything implementing both [`Read`]
/// and [`Seek`] qualifies, e.g. files, cursors over memory, or a
/// `&mut dyn Stream`.
///
/// Sniffing and failed decodes both rely on being able to return to an
/// earlier position, so forward-only readers are not enough.
pub trait Stream: Read + Seek {
	#[inline]
	/// # Tell.
	///
	/// Return the current position, or `None` if the stream can't say.
	fn tell(&mut self) -> Option<u64> { self.stream_position().ok() }

	#[inline]
	/// # Seek To.
	///
	/// Jump to an absolute position, returning `true` on success.
	fn seek_to(&mut self, pos: u64) -> bool {
		self.seek(SeekFrom::Start(pos)).is_ok()
	}
}

impl<T: Read + Seek + ?Sized> Stream for T {}
