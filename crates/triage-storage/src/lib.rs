pub mod error;
pub mod file;
pub mod memory;
pub mod persist;
pub mod traits;

pub use error::*;
pub use file::*;
pub use memory::*;
pub use persist::*;
pub use traits::*;
