//! Askama templates for the control panel.

use askama::Template;

/// Control panel page. Settings, criteria, and the log are loaded by
/// `static/panel.js` from the JSON API.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub account_path: String,
    pub criteria_path: String,
    /// Runs use the mock schedule instead of Korail
    pub mock: bool,
}
