pub mod mind_map;
pub mod toast;
