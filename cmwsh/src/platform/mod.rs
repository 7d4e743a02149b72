//! Platform definitions.
//!
//! A platform bundles the prompt patterns, views, failure markers and
//! session setup commands of one device family.

pub mod comware;
mod definition;
mod privilege_level;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
