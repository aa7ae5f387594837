//! The library code for the `articlepress` site builder. A build is a single
//! linear pass:
//!
//! 1. Loading articles from the content directory ([`crate::loader`]), each
//!    split into front-matter and body ([`crate::frontmatter`])
//! 2. Sorting the articles and resolving prev/next links ([`crate::order`])
//! 3. Rendering each body to HTML ([`crate::markdown`]), replacing PlantUML
//!    blocks with image references ([`crate::diagram`])
//! 4. Wrapping each body in the page template and writing it to disk
//!    ([`crate::page`])
//! 5. Splicing the article list into the index page ([`crate::index`])
//!
//! [`crate::build::build_site`] stitches the steps together.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod build;
pub mod config;
pub mod diagram;
pub mod frontmatter;
pub mod index;
pub mod loader;
pub mod markdown;
pub mod order;
pub mod page;
mod util;
