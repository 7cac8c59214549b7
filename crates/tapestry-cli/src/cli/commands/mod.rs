//! CLI command handlers, one file per command. Each writes its normal output
//! to the given writer; warnings go to stderr.

mod extract_html;
mod init_config;
mod safe_download;
mod sanitize_filename;
mod validate_url;
mod vtt_to_text;

pub use extract_html::run_extract_html;
pub use init_config::run_init_config;
pub use safe_download::run_safe_download;
pub use sanitize_filename::run_sanitize_filename;
pub use validate_url::run_validate_url;
pub use vtt_to_text::run_vtt_to_text;
