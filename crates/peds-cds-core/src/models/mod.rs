//! Domain models for the pediatric knowledge base.

mod content;
mod drug;
mod protocol;

pub use content::*;
pub use drug::*;
pub use protocol::*;
