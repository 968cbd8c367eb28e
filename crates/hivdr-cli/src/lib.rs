pub mod load_data;
pub mod predict;
pub mod train;
pub mod util;
