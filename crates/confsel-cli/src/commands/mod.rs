pub mod cluster;
pub mod select;
