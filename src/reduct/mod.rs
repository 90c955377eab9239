//! Numeric reduction: operator table, element-wise application and delta
//! reduction of folded expressions.

pub mod apply;
pub mod fold;
pub mod ops;

pub use apply::{apply_binary, apply_unary, execute_map, Reduct};
pub use fold::{delta_reduce, reorder};
pub use ops::{broadcast, map_unary, ArithOp};
