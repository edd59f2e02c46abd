// Components module - reusable UI building blocks
//
// Shell components are drawn on every frame:
// - Title bar: app name, backend, tab strip
// - Status bar: uptime, key help, latest warning
// - Banner: notification overlay
//
// Tab content is a form panel above one or more region panels.

pub mod banner;
pub mod form_panel;
pub mod region_panel;
pub mod status_bar;
pub mod title_bar;
