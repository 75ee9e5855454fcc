pub mod connection;
pub mod errors;
pub mod session;
pub mod shell;
pub mod wall;

pub mod prelude {
    pub use crate::connection::*;
    pub use crate::errors::*;
    pub use crate::session::prelude::*;
    pub use crate::wall::*;
}
