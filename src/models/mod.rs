mod entities;
mod product;

pub use entities::*;
pub use product::*;
