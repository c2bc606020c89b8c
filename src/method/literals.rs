use crate::method::CompiledMethod;
use std::fmt;
use std::slice::Iter;
use std::sync::Arc;

/// Value stored in a literal pool
#[derive(Clone, Debug)]
pub enum Literal {
    Nil,
    True,
    False,
    Integer(i64),
    Float(f64),
    Symbol(String),
    String(String),

    /// Nested method or block body
    Method(Arc<CompiledMethod>),
}

impl Literal {
    /// Nested compiled method, if that is what this literal is
    pub fn as_method(&self) -> Option<&Arc<CompiledMethod>> {
        match self {
            Literal::Method(method) => Some(method),
            _ => None,
        }
    }
}

/// Nested methods compare by identity, everything else by value
impl PartialEq for Literal {
    fn eq(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::Nil, Literal::Nil)
            | (Literal::True, Literal::True)
            | (Literal::False, Literal::False) => true,
            (Literal::Integer(a), Literal::Integer(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Symbol(a), Literal::Symbol(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Method(a), Literal::Method(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Nil => f.write_str("nil"),
            Literal::True => f.write_str("true"),
            Literal::False => f.write_str("false"),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Symbol(sym) => write!(f, ":{}", sym),
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Method(method) => {
                write!(f, "#<CompiledMethod {}", method.name().unwrap_or("<anonymous>"))?;
                if let Some(file) = method.defining_file() {
                    write!(f, " {}", file)?;
                    let line = method.first_defined_line();
                    if line > 0 {
                        write!(f, ":{}", line)?;
                    }
                }
                f.write_str(">")
            }
        }
    }
}

/// Ordered, 0-indexed pool of literals referenced from bytecode operands
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiteralPool(Vec<Literal>);

impl LiteralPool {
    pub fn new() -> LiteralPool {
        LiteralPool(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Literal> {
        self.0.get(index)
    }

    /// Append a literal, returning its index
    pub fn push(&mut self, literal: Literal) -> usize {
        self.0.push(literal);
        self.0.len() - 1
    }

    pub fn iter(&self) -> Iter<'_, Literal> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Literal] {
        &self.0
    }
}

impl From<Vec<Literal>> for LiteralPool {
    fn from(literals: Vec<Literal>) -> LiteralPool {
        LiteralPool(literals)
    }
}

impl FromIterator<Literal> for LiteralPool {
    fn from_iter<I: IntoIterator<Item = Literal>>(literals: I) -> LiteralPool {
        LiteralPool(literals.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LiteralPool {
    type Item = &'a Literal;
    type IntoIter = Iter<'a, Literal>;

    fn into_iter(self) -> Iter<'a, Literal> {
        self.0.iter()
    }
}
