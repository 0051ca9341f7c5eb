//! HTTP request handlers.
//!
//! - [`uploads`]: image intake (`POST /upload`)
//! - [`analysis`]: style analysis of an upload (`POST /analyze/{analysis_id}`)
//! - [`recommendations`]: outfit recommendations (`POST /recommendations`)
//! - [`rules`]: fashion rule creation and listing (`/rules`)
//! - [`static_assets`]: landing page and embedded assets

pub mod analysis;
pub mod recommendations;
pub mod rules;
pub mod static_assets;
pub mod uploads;
