mod escape;

pub use escape::{escape_link_destination, escape_link_text, escape_table_cell};
