//! The SeaORM entities of the helper registration database.

mod entities;
pub use entities::*;

pub mod types;

pub mod prelude {
    pub use super::entities::prelude::*;
}
