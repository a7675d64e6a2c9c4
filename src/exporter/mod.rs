pub mod csv_writer;
pub mod preview;

pub use csv_writer::{export_to_dir, to_csv_string, write_csv, Destination};
pub use preview::render_preview;
