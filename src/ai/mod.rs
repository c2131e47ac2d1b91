pub mod evaluate;
pub mod policy;
pub mod search;

pub use evaluate::evaluate;
pub use policy::{MoveSelector, TieredSelector};
pub use search::Searcher;
