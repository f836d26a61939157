/*!
# `RWPNG` - Engine Registry
*/

use super::Binding;
use crate::PngError;
use std::sync::{
	Mutex,
	MutexGuard,
	PoisonError,
};



/// # Engine Factory.
///
/// Build a fresh engine binding. Registries call this once per lifetime,
/// i.e. whenever their reference count climbs from zero.
pub type Factory = fn() -> Result<Binding, PngError>;

/// # Global Registry.
static GLOBAL: Registry = Registry::new(default_engine);



#[derive(Debug)]
/// # Engine Registry.
///
/// A reference-counted owner of one engine binding. Every successful
/// [`Registry::acquire`] must eventually be paired with a
/// [`Registry::release`]; the engine is built on the first acquisition and
/// dropped when the last one is released.
///
/// The module-level [`init`](crate::init)/[`quit`](crate::quit) pair drives
/// [`Registry::global`], but independent registries can be built around any
/// factory.
pub struct Registry {
	factory: Factory,
	state: Mutex<State>,
}

#[derive(Debug)]
/// # Registry State.
struct State {
	count: usize,
	engine: Option<Binding>,
}

impl Registry {
	#[must_use]
	/// # New.
	pub const fn new(factory: Factory) -> Self {
		Self {
			factory,
			state: Mutex::new(State { count: 0, engine: None }),
		}
	}

	#[must_use]
	/// # Global.
	///
	/// Return the process-wide registry bound to the default engine.
	pub fn global() -> &'static Self { &GLOBAL }

	/// # Acquire.
	///
	/// Increment the reference count, building the engine if this is the
	/// first acquisition, and return the new count.
	///
	/// ## Errors
	///
	/// If the engine cannot be built, the error is returned and the count
	/// is left at zero.
	pub fn acquire(&self) -> Result<usize, PngError> {
		let mut state = self.lock();

		if state.count == 0 {
			state.engine = Some((self.factory)()?);
			log::debug!("PNG engine initialized.");
		}

		state.count += 1;
		Ok(state.count)
	}

	/// # Release.
	///
	/// Decrement the reference count, dropping the engine once it reaches
	/// zero, and return the new count. Releasing an unheld registry does
	/// nothing.
	pub fn release(&self) -> usize {
		let mut state = self.lock();

		if state.count == 0 {
			log::warn!("PNG engine released more times than it was acquired.");
			return 0;
		}

		state.count -= 1;
		if state.count == 0 {
			state.engine = None;
			log::debug!("PNG engine released.");
		}

		state.count
	}

	/// # Binding.
	///
	/// Return a handle to the engine. The handle stays usable even if the
	/// registry is released in the meantime.
	///
	/// ## Errors
	///
	/// Returns [`PngError::BindingUnavailable`] if the registry is not
	/// currently held.
	pub fn binding(&self) -> Result<Binding, PngError> {
		self.lock().engine.clone().ok_or(PngError::BindingUnavailable)
	}

	#[must_use]
	/// # Reference Count.
	pub fn count(&self) -> usize { self.lock().count }

	/// # Lock.
	///
	/// The state is a counter and an `Option`, neither of which can be left
	/// half-written, so a poisoned lock is simply recovered.
	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}



#[cfg(feature = "png")]
/// # Default Engine.
fn default_engine() -> Result<Binding, PngError> {
	Ok(Binding::from(super::png::PngEngine))
}

#[cfg(not(feature = "png"))]
/// # Default Engine.
const fn default_engine() -> Result<Binding, PngError> {
	Err(PngError::BindingUnavailable)
}
