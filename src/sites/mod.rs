//! Site scrapers.
//!
//! Each scraper targets one external site and shares the same pipeline:
//! fetch through a [`Session`](crate::fetch::Session), parse with the
//! helpers in [`crate::parse`], push rows into an
//! [`Accumulator`](crate::record::Accumulator), export with
//! [`export_csv`](crate::export::export_csv).
//!
//! Every scraper keeps its origin as a field so tests can point it at a
//! local mock server.

mod bse_derivatives;
mod ces_products;
mod dongchedi_index;
mod nyc_airports;

pub use bse_derivatives::{BseDerivatives, FormState, MonthWindow, ReportFilter};
pub use ces_products::{CesProducts, ProductCard};
pub use dongchedi_index::{Brand, DongchediIndex, Series, YearWindow};
pub use nyc_airports::{NycAirports, WaitTimeKind};

use std::path::PathBuf;

use clap::ValueEnum;
use url::Url;

use crate::config::OUTPUT_SUFFIX;

/// The sites this tool can scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Site {
    /// City Electric Supply wire and cable catalog
    CesProducts,
    /// Security and customs wait times at JFK, LGA and EWR
    NycAirports,
    /// Dongchedi brand/series popularity index
    DongchediIndex,
    /// BSE historical derivatives turnover
    BseDerivatives,
}

impl Site {
    /// Human-readable job name, logged at start of run.
    pub fn job_name(self) -> &'static str {
        match self {
            Site::CesProducts => ces_products::JOB_NAME,
            Site::NycAirports => nyc_airports::JOB_NAME,
            Site::DongchediIndex => dongchedi_index::JOB_NAME,
            Site::BseDerivatives => bse_derivatives::JOB_NAME,
        }
    }

    /// Header row of this site's CSV output.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Site::CesProducts => ces_products::COLUMNS,
            Site::NycAirports => nyc_airports::COLUMNS,
            Site::DongchediIndex => dongchedi_index::COLUMNS,
            Site::BseDerivatives => bse_derivatives::COLUMNS,
        }
    }

    fn output_dir(self) -> &'static str {
        match self {
            Site::CesProducts => ces_products::OUTPUT_DIR,
            Site::NycAirports => nyc_airports::OUTPUT_DIR,
            Site::DongchediIndex => dongchedi_index::OUTPUT_DIR,
            Site::BseDerivatives => bse_derivatives::OUTPUT_DIR,
        }
    }

    /// Output path used when no filename is given: `<job dir>/<job slug>-data.csv`.
    pub fn default_output(self) -> PathBuf {
        PathBuf::from(self.output_dir())
            .join(format!("{}{}", job_slug(self.job_name()), OUTPUT_SUFFIX))
    }
}

/// Lowercased job name with spaces turned into dashes.
///
/// A trailing "using <tool>" qualifier is dropped first.
pub fn job_slug(job_name: &str) -> String {
    let name = job_name.split(" using ").next().unwrap_or(job_name);
    name.trim().to_lowercase().replace(' ', "-")
}

/// Parses a compiled-in URL.
///
/// # Panics
///
/// Panics if `url` is not a valid absolute URL. Only use it for constants,
/// where a failure is a programming error.
fn constant_url(url: &str) -> Url {
    Url::parse(url).unwrap_or_else(|e| {
        panic!("Failed to parse built-in URL '{url}': {e}. This is a programming error.")
    })
}
