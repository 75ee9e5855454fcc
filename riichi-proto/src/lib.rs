pub mod frame;
pub mod header;
pub mod queue;

pub mod prelude {
    pub use crate::frame::*;
    pub use crate::header::*;
    pub use crate::queue::*;
}
