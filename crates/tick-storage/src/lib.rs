pub mod memory;
pub mod repo;
pub mod traits;

pub use memory::*;
pub use repo::*;
pub use traits::*;
