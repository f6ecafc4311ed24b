pub mod card;
pub mod charts;
pub mod item_table;
