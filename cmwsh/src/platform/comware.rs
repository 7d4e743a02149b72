//! H3C Comware platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! <sw1>                              # user view
//! [sw1]                              # system view
//! [sw1-GigabitEthernet1/0/1]         # system sub-view (interface)
//! ```
//!
//! # View Graph
//!
//! ```text
//! ┌───────────┐  system-view  ┌─────────────┐
//! │ user_view ├───────────────► system_view │
//! │  <...>    │    return     │   [...]     │
//! └───────────┘◄──────────────┴─────────────┘
//! ```

use super::{PlatformDefinition, PrivilegeLevel};

/// Platform name used in logs and error messages.
pub const PLATFORM_NAME: &str = "h3c_comware";

/// Name of the root view.
pub const USER_VIEW: &str = "user_view";

/// Name of the configuration view.
pub const SYSTEM_VIEW: &str = "system_view";

/// Create the Comware platform definition.
pub fn platform() -> PlatformDefinition {
    let user_view = PrivilegeLevel::new(USER_VIEW, r"(?m)^<[^<>\r\n]{1,63}>\s*$").unwrap();

    let system_view = PrivilegeLevel::new(SYSTEM_VIEW, r"(?m)^\[[^\[\]\r\n]{1,127}\]\s*$")
        .unwrap()
        .with_parent(USER_VIEW)
        .with_escalate("system-view")
        .with_deescalate("return");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(user_view)
        .with_privilege(system_view)
        .with_config_privilege(SYSTEM_VIEW)
        .with_failure_pattern("% Unrecognized command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Wrong parameter")
        .with_failure_pattern("% Too many parameters")
        .with_failure_pattern("% Ambiguous command")
        .with_on_open_command("screen-length disable")
        .with_terminal_size(511, 24)
}
