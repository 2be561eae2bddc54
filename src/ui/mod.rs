pub mod progress;
pub mod reporter;

pub use reporter::Reporter;
