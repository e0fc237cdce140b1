//! Account block segmentation and field extraction.

pub mod aggregate;
pub mod layout;
mod parser;
pub mod rules;
mod segmenter;

pub use aggregate::{aggregate, Totals};
pub use layout::{LayoutConfig, TemplateLayout};
pub use parser::{BillParser, BlockOutcome, BlockParser};
pub use segmenter::{segment, Segmenter};
