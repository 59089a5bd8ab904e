//! Pure review engine: identity, categories, themes, grouping, statuses, bulk
//! propagation and progress. No I/O happens in this crate.

pub mod bulk;
pub mod category;
pub mod chat;
mod de;
pub mod error;
pub mod grouping;
pub mod identity;
pub mod ids;
pub mod model;
pub mod progress;
pub mod review;
pub mod status;
pub mod theme;
pub mod types;

pub use bulk::*;
pub use category::*;
pub use chat::*;
pub use error::*;
pub use grouping::*;
pub use identity::*;
pub use ids::*;
pub use model::*;
pub use progress::*;
pub use review::*;
pub use status::*;
pub use theme::*;
pub use types::*;
