// Re-export all model types for ease of use

pub mod analysis;
pub mod document;
pub mod responses;

pub use analysis::*;
pub use document::*;
pub use responses::*;
