pub use shakmaty;

pub mod commentary;
pub mod notation;
pub mod opponent;
pub mod rules;
