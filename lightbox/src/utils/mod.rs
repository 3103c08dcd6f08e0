pub mod assets;
pub mod site;

pub use crate::utils::{
  assets::copy_assets,
  site::{BuildSummary, collect_html_files, page_url, process_site},
};
