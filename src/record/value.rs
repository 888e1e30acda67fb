//! Heterogeneous log arguments.
//!
//! Callers pass strings, numbers, and nested structures side by side. `Shared`
//! cells let one argument reference another (or itself), so every traversal here
//! tracks the cells on the current path and never follows a cycle.

use serde_json::{Map, Number};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Substituted for a shared cell that is already being rendered further up the tree.
pub const CIRCULAR_MARKER: &str = "[Circular]";
/// Substituted for an object found below the depth limit.
pub const OBJECT_MARKER: &str = "[object]";
/// Substituted for an array found below the depth limit.
pub const ARRAY_MARKER: &str = "[array]";

/// Reference cell inside a [`Value`]; cloning shares the same cell.
pub type SharedValue = Arc<RwLock<Value>>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    /// Ordered fields; rendering keeps the caller's key order.
    Object(Vec<(String, Value)>),
    Shared(SharedValue),
}

impl Value {
    /// Wraps `value` in a fresh shared cell.
    #[must_use]
    pub fn shared(value: Self) -> Self {
        Self::Shared(Arc::new(RwLock::new(value)))
    }

    /// Builds an object from `(key, value)` pairs.
    #[must_use]
    pub fn object<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to JSON, replacing containers below `depth` with markers and cycles
    /// with [`CIRCULAR_MARKER`]. `None` means no depth limit.
    #[must_use]
    pub fn to_json(&self, depth: Option<usize>) -> serde_json::Value {
        let mut path = Vec::new();
        self.to_json_inner(depth, &mut path)
    }

    fn to_json_inner(
        &self,
        remaining: Option<usize>,
        path: &mut Vec<*const RwLock<Self>>,
    ) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => Json::Number(n.clone()),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => {
                if remaining == Some(0) {
                    return Json::String(ARRAY_MARKER.to_string());
                }
                let next = remaining.map(|d| d - 1);
                Json::Array(
                    items
                        .iter()
                        .map(|item| item.to_json_inner(next, path))
                        .collect(),
                )
            }
            Self::Object(fields) => {
                if remaining == Some(0) {
                    return Json::String(OBJECT_MARKER.to_string());
                }
                let next = remaining.map(|d| d - 1);
                let mut map = Map::with_capacity(fields.len());
                for (key, value) in fields {
                    map.insert(key.clone(), value.to_json_inner(next, path));
                }
                Json::Object(map)
            }
            Self::Shared(cell) => {
                let ptr = Arc::as_ptr(cell);
                if path.contains(&ptr) {
                    return Json::String(CIRCULAR_MARKER.to_string());
                }
                path.push(ptr);
                let inner = cell.read().unwrap_or_else(PoisonError::into_inner);
                let json = inner.to_json_inner(remaining, path);
                drop(inner);
                path.pop();
                json
            }
        }
    }
}

impl fmt::Display for Value {
    /// Strings print verbatim; everything else as compact, cycle-safe JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json(None)),
        }
    }
}

// Derived `Debug` would walk into shared cells and never return on a cycle.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Self::Shared(cell) => write!(f, "Shared({:p})", Arc::as_ptr(cell)),
        }
    }
}

impl PartialEq for Value {
    /// Shared cells compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Shared(a), Self::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Self::String(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Self::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// NaN and infinities have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Self::from(f64::from(n))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&crate::Error> for Value {
    fn from(e: &crate::Error) -> Self {
        Self::String(e.to_string())
    }
}

/// Builds a `Vec<Value>` from mixed arguments: `args!["loaded", 3, json!({"a": 1})]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($arg)),+]
    };
}
