pub mod meld;
pub mod player;
pub mod tile;
pub mod yaku;

pub mod prelude {
    pub use crate::meld::*;
    pub use crate::player::*;
    pub use crate::tile::*;
    pub use crate::yaku::*;
}
