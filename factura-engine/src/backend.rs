//! The minimal polymorphic contract a headless rendering engine satisfies.
//!
//! Any library that can launch an isolated process, load self-contained
//! markup into a page, and export that page as a binary document can sit
//! behind these two traits. [`crate::ChromeBackend`] is the production
//! implementation; [`crate::testing::MockBackend`] drives tests.

use factura_core::RenderProfile;

use crate::error::EngineError;

/// A live page context inside a launched engine process.
///
/// Implementations own both the process handle and the page handle. A page
/// serves exactly one render attempt and is never reused.
pub trait EnginePage {
    /// Load self-contained markup and wait for the document-ready signal,
    /// bounded by the profile's content-load timeout.
    fn set_content(&mut self, markup: &str) -> Result<(), EngineError>;

    /// Export the current document as PDF bytes (A4, printable background,
    /// fixed margins), bounded by the profile's export timeout.
    fn export_pdf(&mut self) -> Result<Vec<u8>, EngineError>;

    /// Tear down the page handle first, then the process handle. Must be
    /// safe to call more than once. Returns the first teardown failure so
    /// the caller can log it; callers never propagate it.
    fn close(&mut self) -> Result<(), EngineError>;
}

/// Launches one isolated engine process + page per render attempt,
/// configured by the attempt's [`RenderProfile`].
pub trait RenderBackend {
    fn launch(&self, profile: &RenderProfile) -> Result<Box<dyn EnginePage>, EngineError>;
}
