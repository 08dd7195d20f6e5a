pub mod allocation;
pub mod instrument;
pub mod profile;

pub use allocation::{AllocationRecord, PreviewRow};
pub use instrument::Instrument;
pub use profile::{Horizon, RiskProfile};
