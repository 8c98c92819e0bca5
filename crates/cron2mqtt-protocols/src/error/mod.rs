//! Error types for the cron2mqtt protocol layer.

mod device;
mod discovery;
mod multi;
mod publish;
mod registry;
mod schedule;
mod topic;
mod transport;

pub use device::*;
pub use discovery::*;
pub use multi::*;
pub use publish::*;
pub use registry::*;
pub use schedule::*;
pub use topic::*;
pub use transport::*;
