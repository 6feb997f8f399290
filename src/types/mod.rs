//! Data types shared by the cache, the renderers, and the session.

mod address;
mod finding;
mod sheet;
mod tile;

pub use address::*;
pub use finding::*;
pub use sheet::*;
pub use tile::*;
