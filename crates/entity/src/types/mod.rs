//! The choice types stored in the columns of the entities.

mod food_instruction;
mod shirt_size;

pub use food_instruction::*;
pub use shirt_size::*;
