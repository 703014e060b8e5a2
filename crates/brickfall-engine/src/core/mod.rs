pub use self::{glass::*, piece::*};

pub(crate) mod glass;
pub(crate) mod piece;
