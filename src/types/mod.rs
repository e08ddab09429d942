//! Validated input types: scan targets and the ports found on them.

mod port;
mod target;

pub use port::{Port, PortError, PortList};
pub use target::{TargetError, TargetSpec};
