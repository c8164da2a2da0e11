// Library exports for choropleth

pub mod basemap;
pub mod color;
pub mod config;
pub mod debounce;
pub mod domain;
pub mod extract;
pub mod feature;
pub mod format;
pub mod legend;
pub mod palette;
pub mod value_table;

// Pipeline
pub mod scale;
pub mod resolve;
pub mod pipeline;
pub mod render;
pub mod session;
