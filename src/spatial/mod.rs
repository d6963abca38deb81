pub mod index;

pub use index::{HitIndex, HitShape, Propagation};
