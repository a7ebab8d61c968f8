pub mod canvas;
pub mod plot;
