pub mod metrics;
pub mod strng;

/// Re-exports the handful of names every module in the gateway pulls in with a single
/// `use agent_core::prelude::*;`.
pub mod prelude {
	pub use tracing::{debug, error, info, trace, warn};

	pub use crate::strng;
	pub use crate::strng::Strng;
}
