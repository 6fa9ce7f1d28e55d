//! Export of accumulated records.
//!
//! Every scraper ends by handing its records and declared column order to
//! [`export_csv`].

mod csv;

pub use csv::export_csv;
