/*!
# `RWPNG` - Format Sniffing
*/

use crate::Stream;



/// # PNG Signature.
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];



/// # Is PNG?
///
/// Peek at the next eight bytes of the stream and report whether they hold
/// the PNG signature.
///
/// The stream is always returned to the position it had on entry, whatever
/// the outcome, so this is purely advisory. Short reads, I/O errors, and
/// `None` all answer `false`, as does every stream when the crate is built
/// without the `png` feature.
pub fn is_png<S: Stream + ?Sized>(src: Option<&mut S>) -> bool {
	if cfg!(not(feature = "png")) { return false; }
	let Some(src) = src else { return false; };
	let Some(start) = src.tell() else { return false; };

	let mut magic = [0_u8; 8];
	let found = src.read_exact(&mut magic).is_ok() && magic == PNG_MAGIC;

	if ! src.seek_to(start) {
		log::warn!("Unable to rewind the stream after sniffing.");
	}

	found
}
