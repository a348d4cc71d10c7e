pub mod lookup;
pub mod extract;
pub mod menu;
