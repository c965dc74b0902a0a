pub mod pen;
pub mod scene;

pub use pen::*;
pub use scene::*;
