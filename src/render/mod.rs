pub mod fonts;
pub mod geometry;
pub mod raster;
