//! Domain models for the autoconfigurator
//!
//! This module contains pure domain objects representing the host runtime's
//! view of installed components. These types are free of runtime behaviour.

pub mod component;

pub use component::{Activation, ComponentRecord, ComponentState, ROOT_COMPONENT_ID, StartLevel};
