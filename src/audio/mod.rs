pub mod analysis;
pub mod brightness;
pub mod calibrate;
pub mod decode;
pub mod energy;
pub mod error;
pub mod features;
pub mod window;
