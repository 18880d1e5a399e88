// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete feature implementations (§4.9, §4.11).

pub mod device_info;
pub mod energy_control;
pub mod test_control;

pub use device_info::build_device_info_feature;
pub use energy_control::{build_energy_control_feature, ControlState, ControlStatePrior, LimitKind, LimitResolver};
pub use test_control::build_test_control_feature;
