//! Content-preparation utilities: URL screening, bounded downloads, filename
//! sanitizing, and text extraction from HTML pages and VTT captions.

pub mod config;
pub mod fetch;
pub mod html;
pub mod logging;
pub mod sanitize;
pub mod storage;
pub mod url_guard;
pub mod vtt;
