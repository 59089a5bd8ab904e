pub mod check;
pub mod error;
pub mod fingerprint;
pub mod load;

pub use check::*;
pub use error::*;
pub use fingerprint::*;
pub use load::*;
