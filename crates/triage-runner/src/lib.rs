pub mod config;
pub mod doctor;
pub mod reviewer;
pub mod scenario;
pub mod util;
pub mod workspace;

pub use config::*;
pub use doctor::*;
pub use reviewer::*;
pub use util::*;
pub use workspace::*;
