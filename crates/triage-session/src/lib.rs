pub mod codec;
pub mod error;
pub mod export;
pub mod store;

pub use codec::*;
pub use error::*;
pub use export::*;
pub use store::*;
