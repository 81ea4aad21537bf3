pub mod article;
pub mod category;

pub use article::{Article, DEFAULT_DESCRIPTION, NO_LINK};
pub use category::Category;
