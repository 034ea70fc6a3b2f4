//! Side-effectful collaborators for pastefmt hosts: the system clipboard
//! reader and the HTML clipboard capture helper. Both shell out to external
//! commands with a bounded wait.

pub mod clipboard;
pub mod html_capture;
mod process;

pub use clipboard::SystemClipboard;
pub use html_capture::HelperCapture;
