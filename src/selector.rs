//! Tracking which axis the controller has selected.
//!
//! The controller keeps one piece of session state: the axis that receives
//! the next axis-scoped command (`:GOABS`, `:POS?`, ...). It is changed by
//! `AXI<n>`, but also by anything else that talks to the controller, such
//! as the front panel or a stored program. [`AxisSelector`] therefore
//! re-selects before every axis-scoped command unless asked to cache.

use crate::{
	backend::Backend,
	error::Error,
	port::Port,
	protocol::{Axis, Command},
};

/// When the [`AxisSelector`] sends `AXI<n>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SelectionPolicy {
	/// Select the axis before every axis-scoped command.
	#[default]
	Always,
	/// Only select when the target differs from the last successful
	/// selection, or when the controller's selection is unknown.
	///
	/// This is only correct if nothing else changes the controller's
	/// selection while this client is connected. The cache is forgotten
	/// whenever this library issues anything that may change the selection
	/// behind its back (a reset, a program run, or a raw command), and
	/// whenever a selection fails.
	Cached,
}

/// Emits axis selection commands according to a [`SelectionPolicy`].
#[derive(Debug, Clone, Default)]
pub struct AxisSelector {
	policy: SelectionPolicy,
	/// The last axis selected successfully, if known.
	selected: Option<Axis>,
}

impl AxisSelector {
	/// Create a selector with the given policy. Nothing is assumed to be selected.
	pub fn new(policy: SelectionPolicy) -> Self {
		AxisSelector {
			policy,
			selected: None,
		}
	}

	/// Get the policy.
	pub fn policy(&self) -> SelectionPolicy {
		self.policy
	}

	/// Change the policy. The cached selection is forgotten.
	pub fn set_policy(&mut self, policy: SelectionPolicy) {
		self.policy = policy;
		self.invalidate();
	}

	/// Get the axis this selector last selected, if it is still known.
	pub fn selected(&self) -> Option<Axis> {
		self.selected
	}

	/// Forget the cached selection, so the next axis-scoped command selects
	/// its axis regardless of the policy.
	pub fn invalidate(&mut self) {
		self.selected = None;
	}

	/// Send `AXI<n>` for `axis` unconditionally.
	pub fn select<B: Backend>(&mut self, port: &mut Port<B>, axis: Axis) -> Result<(), Error> {
		match port.transact(&Command::select(axis)) {
			Ok(_) => {
				self.selected = Some(axis);
				Ok(())
			}
			Err(e) => {
				self.invalidate();
				Err(e)
			}
		}
	}

	/// Make sure `axis` is selected before an axis-scoped command, following
	/// the policy.
	pub fn ensure<B: Backend>(&mut self, port: &mut Port<B>, axis: Axis) -> Result<(), Error> {
		if self.policy == SelectionPolicy::Cached && self.selected == Some(axis) {
			log::trace!("axis {axis} already selected");
			return Ok(());
		}
		self.select(port, axis)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::backend::Mock;

	#[test]
	fn always_policy_reselects() {
		let mut port = Port::open_mock();
		let mut selector = AxisSelector::default();
		assert_eq!(selector.policy(), SelectionPolicy::Always);
		selector.ensure(&mut port, Axis::X).unwrap();
		selector.ensure(&mut port, Axis::X).unwrap();
		selector.ensure(&mut port, Axis::Y).unwrap();
		assert_eq!(port.backend().unwrap().written(), ["AXI1", "AXI1", "AXI2"]);
	}

	#[test]
	fn cached_policy_skips_repeats() {
		let mut port = Port::open_mock();
		let mut selector = AxisSelector::new(SelectionPolicy::Cached);
		selector.ensure(&mut port, Axis::X).unwrap();
		selector.ensure(&mut port, Axis::X).unwrap();
		selector.ensure(&mut port, Axis::Y).unwrap();
		selector.invalidate();
		selector.ensure(&mut port, Axis::Y).unwrap();
		assert_eq!(port.backend().unwrap().written(), ["AXI1", "AXI2", "AXI2"]);
	}

	#[test]
	fn failed_selection_forgets_cache() {
		let mut port = Port::open_mock();
		let mut selector = AxisSelector::new(SelectionPolicy::Cached);
		selector.ensure(&mut port, Axis::X).unwrap();
		assert_eq!(selector.selected(), Some(Axis::X));

		port.backend_mut()
			.unwrap()
			.respond_with(|_| Some("E20".to_string()));
		let err = selector.ensure(&mut port, Axis::Y).unwrap_err();
		assert!(err.is_protocol(), "{err:?}");
		assert_eq!(selector.selected(), None);
	}

	#[test]
	fn select_all() {
		let mut port = Port::from_mock(Mock::new());
		let mut selector = AxisSelector::default();
		selector.select(&mut port, Axis::All).unwrap();
		assert_eq!(port.backend().unwrap().written(), ["AXIALL"]);
	}
}
