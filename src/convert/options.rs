//! Render options
//!
//! The explicit, immutable configuration applied to every conversion. One
//! instance is shared read-only by all jobs in a batch; there is no
//! per-request option surface.

const CM_PER_INCH: f64 = 2.54;

/// Fixed branding line printed in the footer of every document.
pub const FOOTER_TEXT: &str = "© 2025 LionOBytes — Innovating the future. All rights reserved.";

/// Recognized page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    /// Paper dimensions in inches (width, height), portrait orientation.
    pub fn paper_size_inches(&self) -> (f64, f64) {
        match self {
            PageFormat::A3 => (11.69, 16.54),
            PageFormat::A4 => (8.27, 11.69),
            PageFormat::A5 => (5.83, 8.27),
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
            PageFormat::Tabloid => (11.0, 17.0),
        }
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        PageFormat::A4
    }
}

/// Four-sided page margins, stored in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub fn uniform(cm: f64) -> Self {
        Self { top: cm, right: cm, bottom: cm, left: cm }
    }

    pub fn top_inches(&self) -> f64 {
        self.top / CM_PER_INCH
    }

    pub fn right_inches(&self) -> f64 {
        self.right / CM_PER_INCH
    }

    pub fn bottom_inches(&self) -> f64 {
        self.bottom / CM_PER_INCH
    }

    pub fn left_inches(&self) -> f64 {
        self.left / CM_PER_INCH
    }
}

impl Default for Margins {
    fn default() -> Self {
        Margins::uniform(2.0)
    }
}

/// Immutable conversion options shared across all jobs in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub format: PageFormat,
    pub margin: Margins,
    pub print_background: bool,
    pub landscape: bool,
    pub scale: f64,
    pub footer_text: String,
}

impl RenderOptions {
    /// The footer markup handed to the engine, wrapping [`footer_text`]
    /// in the fixed print styling.
    ///
    /// [`footer_text`]: RenderOptions::footer_text
    pub fn footer_html(&self) -> String {
        format!(
            "<div style=\"font-size: 10px; padding: 0; margin: 0; width: 100%; \
             text-align: center; color: rgb(0, 0, 0); font-family: Arial, sans-serif;\">\
             <span>{}</span></div>",
            self.footer_text
        )
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::default(),
            margin: Margins::default(),
            print_background: true,
            landscape: false,
            scale: 1.0,
            footer_text: FOOTER_TEXT.to_string(),
        }
    }
}
