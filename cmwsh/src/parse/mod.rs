//! Screen-scraping building blocks.
//!
//! Output of a multi-entity command is cut into [`Section`]s with a
//! [`SectionBoundary`], then each section is read with [`Fields`].

mod duration;
pub mod extract;
mod section;

pub use duration::parse_duration;
pub use extract::{Fields, MISSING_FLOAT, MISSING_INT, normalize_mac, parse_number};
pub use section::{Section, SectionBoundary};
