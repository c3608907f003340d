pub mod board;
pub mod category;
pub mod controller;
pub mod data;
pub mod endpoints;
pub mod store;
