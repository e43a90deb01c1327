//! Result presentation: title cleanup, size/date rendering, and the aligned
//! selection table.

mod date;
mod details;
mod size;
mod table;
mod title;

pub use date::{format_date, format_date_at, parse_date};
pub use details::render_details;
pub use size::{display_size, format_size, parse_size};
pub use table::{Choice, Column, ColumnPolicy, DisplayColumnSet, TableEntry, TableFormatter};
pub use title::{normalize_title, truncate, ELLIPSIS};
