pub mod log_setup;
pub mod ndbuffer;

pub use ndbuffer::NdBuffer;
