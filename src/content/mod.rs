//! Content module - CMS documents, the file store and resolution

mod document;
mod frontmatter;
pub mod resolver;
pub mod store;

pub use document::{Author, Document, DocumentFields, Field};
pub use frontmatter::FrontMatter;
pub use resolver::{list_latest, resolve};
pub use store::{ContentStore, FileStore};
