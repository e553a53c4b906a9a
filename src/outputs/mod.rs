//! Output generation.
//!
//! # Submodules
//!
//! - [`csv`]: Writes the selected records to a dated CSV file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── topshot_data_03072024.csv
//! ```

pub mod csv;
