//! Arithmetic operator table and element-wise broadcasting.

use crate::types::AtomType;

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// `+`, commutative fold, identity 0.
    Add,
    /// `-`, left fold, right identity 0.
    Subtract,
    /// `*`, commutative fold, identity 1, annihilator 0.
    Multiply,
    /// `/`, left fold, right identity 1.
    Divide,
    /// `x^y`, element-wise binary map.
    Power,
    /// Square root, element-wise unary map.
    Sqrt,
    /// Natural logarithm, element-wise unary map.
    Log,
    /// Exponential, element-wise unary map.
    Exp,
}

impl ArithOp {
    /// All operators.
    pub const ALL: [ArithOp; 8] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
        Self::Sqrt,
        Self::Log,
        Self::Exp,
    ];

    /// Operator for an atom type, if it is one.
    pub fn from_type(t: AtomType) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.atom_type() == t)
    }

    /// Atom type this operator builds.
    pub fn atom_type(self) -> AtomType {
        match self {
            Self::Add => AtomType::Add,
            Self::Subtract => AtomType::Subtract,
            Self::Multiply => AtomType::Multiply,
            Self::Divide => AtomType::Divide,
            Self::Power => AtomType::Power,
            Self::Sqrt => AtomType::Sqrt,
            Self::Log => AtomType::Log,
            Self::Exp => AtomType::Exp,
        }
    }

    /// Takes a single argument.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Sqrt | Self::Log | Self::Exp)
    }

    /// Folds over any number of arguments (delta reduction applies).
    pub fn is_fold(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide
        )
    }

    /// Argument order does not matter.
    pub fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Multiply)
    }

    /// Identity element (right identity for the ordered folds).
    pub fn identity(self) -> Option<f64> {
        match self {
            Self::Add | Self::Subtract => Some(0.0),
            Self::Multiply | Self::Divide => Some(1.0),
            _ => None,
        }
    }

    /// Element that forces the whole fold to itself.
    pub fn annihilator(self) -> Option<f64> {
        match self {
            Self::Multiply => Some(0.0),
            _ => None,
        }
    }

    /// Scalar function for unary operators.
    pub fn unary_fn(self) -> Option<fn(f64) -> f64> {
        match self {
            Self::Sqrt => Some(f64::sqrt),
            Self::Log => Some(f64::ln),
            Self::Exp => Some(f64::exp),
            _ => None,
        }
    }

    /// Scalar function for binary operators.
    pub fn binary_fn(self) -> Option<fn(f64, f64) -> f64> {
        match self {
            Self::Add => Some(|a, b| a + b),
            Self::Subtract => Some(|a, b| a - b),
            Self::Multiply => Some(|a, b| a * b),
            Self::Divide => Some(|a, b| a / b),
            Self::Power => Some(f64::powf),
            _ => None,
        }
    }
}

/// Element-wise `f(x, y)`.
///
/// A length-1 operand is repeated against the other operand; otherwise the
/// result has the length of the shorter operand.
pub fn broadcast(x: &[f64], y: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    match (x, y) {
        ([a], ys) => ys.iter().map(|&b| f(*a, b)).collect(),
        (xs, [b]) => xs.iter().map(|&a| f(a, *b)).collect(),
        (xs, ys) => xs.iter().zip(ys).map(|(&a, &b)| f(a, b)).collect(),
    }
}

/// Element-wise `f(x)`.
pub fn map_unary(x: &[f64], f: impl Fn(f64) -> f64) -> Vec<f64> {
    x.iter().map(|&a| f(a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: f64, b: f64) -> f64 {
        a + b
    }

    #[test]
    fn test_broadcast_scalar() {
        assert_eq!(broadcast(&[1.0, 2.0, 3.0], &[10.0], add), vec![11.0, 12.0, 13.0]);
        assert_eq!(broadcast(&[10.0], &[1.0, 2.0, 3.0], add), vec![11.0, 12.0, 13.0]);
        assert_eq!(broadcast(&[1.0], &[2.0], add), vec![3.0]);
    }

    #[test]
    fn test_broadcast_truncates() {
        assert_eq!(broadcast(&[1.0, 2.0, 3.0], &[10.0, 20.0], add), vec![11.0, 22.0]);
        assert_eq!(broadcast(&[1.0, 2.0], &[10.0, 20.0, 30.0], add), vec![11.0, 22.0]);
    }

    #[test]
    fn test_operator_table() {
        for op in ArithOp::ALL {
            assert_eq!(ArithOp::from_type(op.atom_type()), Some(op));
            assert_eq!(op.is_unary(), op.unary_fn().is_some());
            assert_eq!(!op.is_unary(), op.binary_fn().is_some());
            if op.is_commutative() {
                assert!(op.is_fold());
            }
        }
        assert_eq!(ArithOp::from_type(AtomType::Concept), None);
    }

    #[test]
    fn test_map_unary() {
        let f = ArithOp::Sqrt.unary_fn().unwrap();
        assert_eq!(map_unary(&[4.0, 9.0, 16.0], f), vec![2.0, 3.0, 4.0]);
    }
}
