// ui/mod.rs

pub mod game;
pub mod spinner;

pub use game::draw;
