//! Business operations over a `Store`.

mod author;
mod book;
mod validation;

pub use author::{AuthorSearch, AuthorService};
pub use book::{BookSearch, BookService, NewBook};
pub use validation::{RequestValidator, MAX_TEXT_LENGTH};
