/*!
# `RWPNG` - Library

This crate decodes PNG streams into host-style bitmaps: a padded pixel
buffer plus the depth, channel masks, palette, and colour key needed to
interpret it.

Decoding is split between a decompression [`Engine`], which understands the
file format, and a [`Loader`], which decides how the decoded image should be
represented: greyscale and indexed images stay paletted, simple binary
transparency becomes a colour key, and anything subtler is expanded to a
full alpha channel.

The engine binding is reference counted by a [`Registry`]. The module-level
[`init`], [`quit`], and [`load`] helpers drive the process-wide one.

## Examples

```no_run
use std::fs::File;

rwpng_core::init().unwrap();

let mut file = File::open("image.png").unwrap();
if rwpng_core::is_png(Some(&mut file)) {
	let img = rwpng_core::load(&mut file).unwrap();
	assert!(img.pitch() >= img.width() as usize * img.bytes_per_pixel());
}

rwpng_core::quit();
```
*/

#![warn(clippy::filetype_is_file)]
#![warn(clippy::integer_division)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::unneeded_field_pattern)]
#![warn(macro_use_extern_crate)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(non_ascii_idents)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_crate_dependencies)]
#![warn(unused_extern_crates)]
#![warn(unused_import_braces)]

#![allow(clippy::module_name_repetitions)]



mod dec;
mod engine;
mod error;
mod image;
mod sniff;
mod stream;

#[cfg(test)] mod fixtures;

pub use dec::{
	Loader,
	policy::{
		Key,
		Policy,
	},
};
#[cfg(feature = "png")] pub use engine::png::PngEngine;
pub use engine::{
	Binding,
	Engine,
	Header,
	registry::{
		Factory,
		Registry,
	},
	Session,
	Transparency,
};
pub use error::PngError;
pub use image::{
	Bitmap,
	color::ColorKind,
	mask::{
		ByteOrder,
		ChannelMasks,
	},
	palette::{
		MAX_COLORS,
		Palette,
	},
	rows::RowTable,
};
pub use sniff::{
	is_png,
	PNG_MAGIC,
};
pub use stream::Stream;

use std::cell::Cell;



/// # Transform: Strip Sixteen-Bit.
///
/// Reduce sixteen-bit samples to eight by keeping their high byte.
pub const TRANSFORM_STRIP_16: u8 =    0b0000_0001;

/// # Transform: Unpack.
///
/// Spread one-, two-, and four-bit samples out to one per byte, keeping
/// their values.
pub const TRANSFORM_PACKING: u8 =     0b0000_0010;

/// # Transform: Expand.
///
/// Expand palette indices to RGB (or RGBA, given a transparency chunk) and
/// stretch low-depth greys to the full eight-bit range.
pub const TRANSFORM_EXPAND: u8 =      0b0000_0100;

/// # Transform: Grey to RGB.
///
/// Copy grey samples into all three colour channels.
pub const TRANSFORM_GRAY_TO_RGB: u8 = 0b0000_1000;



thread_local! {
	/// # Most Recent Error.
	static LAST_ERROR: Cell<Option<PngError>> = const { Cell::new(None) };
}



/// # Initialize.
///
/// Acquire the process-wide engine binding, returning the new reference
/// count. Each successful call must be balanced by a call to [`quit`].
///
/// ## Errors
///
/// Returns [`PngError::BindingUnavailable`] if the crate was built without
/// an engine.
pub fn init() -> Result<usize, PngError> {
	record(Registry::global().acquire())
}

/// # Quit.
///
/// Release the process-wide engine binding, returning the new reference
/// count. The engine is dropped once every [`init`] has been matched; extra
/// calls are ignored.
pub fn quit() -> usize { Registry::global().release() }

/// # Load.
///
/// Decode a PNG from the stream's current position using the process-wide
/// engine and a default [`Loader`]. On failure the stream is rewound and the
/// error is also made available through [`last_error`].
///
/// ## Errors
///
/// Returns [`PngError::BindingUnavailable`] if [`init`] has not been called,
/// or any error raised by [`Loader::load`].
pub fn load<S: Stream>(src: &mut S) -> Result<Bitmap, PngError> {
	record(
		Registry::global().binding()
			.and_then(|binding| Loader::new(binding).load(src))
	)
}

#[must_use]
/// # Last Error.
///
/// Return the most recent error raised by [`init`] or [`load`] on this
/// thread, if any.
pub fn last_error() -> Option<PngError> { LAST_ERROR.with(Cell::get) }

/// # Clear Error.
pub fn clear_error() { LAST_ERROR.with(|e| e.set(None)); }

/// # Record Error.
fn record<T>(res: Result<T, PngError>) -> Result<T, PngError> {
	if let Err(e) = &res {
		let e = *e;
		LAST_ERROR.with(|last| last.set(Some(e)));
	}
	res
}
