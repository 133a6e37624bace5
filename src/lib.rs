//! Interaction state for a paged / scrolling manga reader.
//!
//! The reader pieces (tap zones, overlay, auto-scroll, progress bar, chapter
//! window) are plain state machines; [`session::ReaderSession`] wires them
//! together. [`viewer`] drives a session from a terminal.

pub mod auto_scroll;
pub mod chapter_window;
pub mod config;
pub mod duplicates;
pub mod library;
pub mod overlay;
pub mod progress_bar;
pub mod session;
pub mod tap_zone;
pub mod viewer;
pub mod watch;

pub use session::{Effect, PageTurn, ReaderSession};
pub use tap_zone::{TapPoint, TapZoneInvertMode, TapZoneLayout, TapZoneRegionType, classify};

/// `<pkg version> (<git hash>, <profile>)`, or just the version outside git.
pub const VERSION: &str = env!("MANGAVIEW_BUILD_VERSION");
