//! Table algebra
//!
//! Builds `*`/`+` expressions from the entities placed on a layout axis and
//! reduces them to their normalized set form, the list of concrete cells a
//! templated query expands to.

mod errors;
mod expr;
mod nsf;

pub use errors::{AlgebraError, AlgebraResult};
pub use expr::{expansion_values, Expression, Operator};
pub use nsf::{normalize, Cell, CellItem};
