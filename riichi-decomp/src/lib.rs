pub mod calls;
pub mod decompose;
pub mod errors;
pub mod hand;
pub mod scoring;

pub mod prelude {
    pub use crate::calls::*;
    pub use crate::decompose::*;
    pub use crate::errors::*;
    pub use crate::hand::*;
    pub use crate::scoring::*;
}
