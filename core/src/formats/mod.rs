pub mod descriptor;
pub mod raw_tile;
