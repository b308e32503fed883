//! The element domain of sets.
//!
//! Every member of a set is a [Value]. Numeric members are [Number]s, which compare by numeric value only:
//! the integer `1` and the float `1.0` denote the same member.

use std::fmt::Display;

use num_traits::ToPrimitive;
use ordered_float::OrderedFloat;
use quickcheck::Arbitrary;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A numeric scalar with a total order.
///
/// Backed by an `f64`, so integers are exact up to 2^53.
/// Negative and positive zero are the same number.
///
/// # Examples
/// ```
/// use index_sets::Number;
///
/// assert_eq!(Number::from(3), Number::from(3.0));
/// assert!(Number::from(2).is_integral());
/// assert!(!Number::from(2.5).is_integral());
/// assert_eq!(Number::from(7).to_string(), "7");
/// assert_eq!(Number::from(0.25).to_string(), "0.25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Number(OrderedFloat<f64>);

impl Number {
    /// Create a new number.
    pub fn new(value: f64) -> Self {
        // -0.0 is folded into 0.0
        Number(OrderedFloat(if value == 0.0 { 0.0 } else { value }))
    }

    /// Returns the underlying floating point value.
    pub fn get(self) -> f64 {
        self.0 .0
    }

    /// Returns `true` if the number is neither infinite nor NaN.
    pub fn is_finite(self) -> bool {
        self.get().is_finite()
    }

    /// Returns `true` if the number is finite and has no fractional part.
    pub fn is_integral(self) -> bool {
        self.is_finite() && self.get().fract() == 0.0
    }

    /// Returns the number as an `i64` if it is integral and in range.
    pub fn to_i64(self) -> Option<i64> {
        if self.is_integral() {
            self.get().to_i64()
        } else {
            None
        }
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number::new(v as f64)
                }
            }
        )*
    };
}

number_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = self.get();
        if v == 0.0 {
            write!(f, "0")
        } else {
            write!(f, "{}", v)
        }
    }
}

impl Arbitrary for Number {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // Small values make collisions between generated ranges likely.
        let n = i8::arbitrary(g) as f64 / 4.0;
        if bool::arbitrary(g) {
            Number::new(n.round())
        } else {
            Number::new((n * 2.0).round() / 2.0)
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.get().shrink().filter(|v| v.is_finite()).map(Number::new))
    }
}

/// A (possibly unbounded) endpoint of a numeric range, as accepted by the range constructors.
///
/// Any number converts into a bounded endpoint, [UNBOUNDED] is the unbounded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(Option<Number>);

/// The unbounded endpoint.
pub const UNBOUNDED: Endpoint = Endpoint(None);

impl Endpoint {
    /// Returns the bound, or `None` if the endpoint is unbounded.
    pub fn get(self) -> Option<Number> {
        self.0
    }
}

macro_rules! endpoint_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Endpoint {
                fn from(v: $t) -> Self {
                    Endpoint(Some(Number::from(v)))
                }
            }
        )*
    };
}

endpoint_from!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, Number);

impl From<Option<Number>> for Endpoint {
    fn from(v: Option<Number>) -> Self {
        Endpoint(v)
    }
}

/// A member of a set.
///
/// Values are totally ordered: `None` sorts before all numbers, numbers sort before strings and strings sort
/// before tuples. Tuples compare lexicographically.
///
/// # Examples
/// ```
/// use index_sets::Value;
///
/// let mut values = vec![Value::from("a"), Value::from(2), Value::None, Value::from(1.5)];
/// values.sort();
/// assert_eq!(values, vec![Value::None, Value::from(1.5), Value::from(2), Value::from("a")]);
/// assert_eq!(Value::from((1, "x")).to_string(), "(1, x)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// The absent value.
    None,
    /// A number.
    Num(Number),
    /// A string.
    Str(String),
    /// A tuple of values.
    Tuple(Vec<Value>),
}

impl Value {
    /// Returns the number if this value is numeric.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns `true` if this value is a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Num(_))
    }

    /// The dimension of the value: the arity for tuples and `1` for everything else.
    pub fn dimen(&self) -> usize {
        match self {
            Value::Tuple(items) => items.len(),
            _ => 1,
        }
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Num(Number::from(v))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, Number);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::None,
        }
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Num(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Arbitrary for Value {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        match u8::arbitrary(g) % 10 {
            0 => Value::None,
            1 => Value::Str(g.choose(&["a", "b", "c"]).copied().unwrap_or("a").to_string()),
            2 => Value::from((Number::arbitrary(g), Number::arbitrary(g))),
            _ => Value::Num(Number::arbitrary(g)),
        }
    }
}
