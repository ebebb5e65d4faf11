pub mod backup;
pub mod core;
pub mod deck;
pub mod dictionary;
pub mod gui;
pub mod persistence;
pub mod store;
