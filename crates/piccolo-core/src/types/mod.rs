mod answer;
mod cert;
mod chain;
mod link;
mod trust;

pub use answer::*;
pub use cert::*;
pub use chain::*;
pub use link::*;
pub use trust::*;
