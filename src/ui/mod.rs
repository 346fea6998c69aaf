pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, section, status, success, summary_row, warn};
pub use progress::ImportProgress;
pub use table::{TableBuilder, stats_table};
pub use theme::{Theme, theme};
