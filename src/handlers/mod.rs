//! HTTP handlers for the author and book resources.

pub mod author;
pub mod book;
pub mod params;
