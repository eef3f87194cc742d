//! Custom widgets for the coinlens UI

pub mod price_tag;

pub use price_tag::LastPriceTag;
