pub mod protocol;
pub mod raster;
pub mod request;

pub use protocol::*;
pub use raster::*;
pub use request::*;
