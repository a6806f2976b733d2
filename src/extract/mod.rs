//! Webpage text extraction.
//!
//! # Responsibilities
//! - Drop non-content blocks (script, style, nav, header, footer)
//! - Strip remaining markup and decode the handful of common entities
//! - Normalize whitespace and bound the output size
//!
//! # Design Decisions
//! - Best effort, not a DOM parser: regex passes over the raw string
//! - Total function; malformed input degrades instead of erroring
//! - No numeric or other named entity decoding

pub mod html;

pub use html::{extract_text, extract_text_with_limit, MAX_CHARS};
