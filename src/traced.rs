//! Decoded values that remember where they came from.
//!
//! Every field a decoder reads is a [`TracedValue`]: the value itself
//! plus the byte range of the input it was read from.
//! Decoders assemble these into a tree of [`Node`]s,
//! which serializes to plain JSON (values only)
//! and can be walked leaf by leaf to map bytes back to fields.
//!
//! [`TracedValue`]: type.TracedValue.html
//! [`Node`]: enum.Node.html

use std::fmt;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A half-open byte range `[start, end)` in the decoded buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A decoded scalar, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl Scalar {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::Unsigned(u) => Some(*u),
            Scalar::Signed(i) => u64::try_from(*i).ok(),
            Scalar::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Unsigned(u) => write!(f, "{u}"),
            Scalar::Signed(i) => write!(f, "{i}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! scalar_from {
    ($variant:ident, $wide:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::$variant(<$wide>::from(v))
                }
            }
        )+
    };
}

scalar_from!(Unsigned, u64, u8, u16, u32, u64);
scalar_from!(Signed, i64, i8, i16, i32, i64);

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_owned())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Unsigned(u) => serializer.serialize_u64(*u),
            Scalar::Signed(i) => serializer.serialize_i64(*i),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A value read from the buffer, along with the bytes it was read from.
///
/// `span` is `None` for synthetic values derived from other fields
/// that have no bytes of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traced<T> {
    pub value: T,
    pub span: Option<Span>,
}

/// The type-erased form stored in a [`Node`] tree
///
/// [`Node`]: enum.Node.html
pub type TracedValue = Traced<Scalar>;

impl<T> Traced<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self {
            value,
            span: Some(span),
        }
    }

    pub fn synthetic(value: T) -> Self {
        Self { value, span: None }
    }

    /// Transforms the value for display, keeping its span.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Traced<U> {
        Traced {
            value: f(self.value),
            span: self.span,
        }
    }
}

impl<T: Into<Scalar>> Traced<T> {
    pub fn erase(self) -> TracedValue {
        self.map(Into::into)
    }
}

impl<T: Into<Scalar>> From<Traced<T>> for Node {
    fn from(t: Traced<T>) -> Self {
        Node::Leaf(t.erase())
    }
}

/// Renders integers as `0x`-prefixed hex, zero-padded to the type's width.
pub fn hex<T: fmt::LowerHex>(width: usize) -> impl FnOnce(T) -> Scalar {
    move |v| Scalar::Text(format!("{:#0w$x}", v, w = width * 2 + 2))
}

/// Fields of a decoded structure, in the order they were read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    fields: Vec<(&'static str, Node)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<N: Into<Node>>(&mut self, key: &'static str, node: N) {
        self.fields.push((key, node.into()));
    }

    /// Inserts a traced integer as-is, handing back the raw value
    /// so the caller can keep decoding with it.
    pub fn field<T: Copy + Into<Scalar>>(&mut self, key: &'static str, read: Traced<T>) -> T {
        let raw = read.value;
        self.insert(key, read);
        raw
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Node)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Object> for Node {
    fn from(o: Object) -> Self {
        Node::Object(o)
    }
}

impl From<Vec<Node>> for Node {
    fn from(l: Vec<Node>) -> Self {
        Node::List(l)
    }
}

/// A node in a decoded structure tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(TracedValue),
    Object(Object),
    List(Vec<Node>),
}

impl Node {
    /// An empty object, for structures a decoder knows of but doesn't read.
    pub fn empty() -> Self {
        Node::Object(Object::new())
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|o| o.get(key))
    }

    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_list().and_then(|l| l.get(index))
    }

    pub fn as_leaf(&self) -> Option<&TracedValue> {
        match self {
            Node::Leaf(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    /// The leaf's value, if this is a leaf.
    pub fn value(&self) -> Option<&Scalar> {
        self.as_leaf().map(|t| &t.value)
    }

    /// The leaf's span, if this is a leaf backed by bytes.
    pub fn span(&self) -> Option<Span> {
        self.as_leaf().and_then(|t| t.span)
    }

    /// Returns every leaf in the tree along with its path
    /// (e.g. `central_directory.headers[0].file_name`), in tree order.
    ///
    /// This is all a hex dump needs to tie bytes back to fields.
    pub fn leaves(&self) -> Vec<(String, &TracedValue)> {
        let mut out = Vec::new();
        collect_leaves(self, String::new(), &mut out);
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn collect_leaves<'a>(node: &'a Node, path: String, out: &mut Vec<(String, &'a TracedValue)>) {
    match node {
        Node::Leaf(t) => out.push((path, t)),
        Node::Object(o) => {
            for (k, v) in o.iter() {
                let child = if path.is_empty() {
                    k.to_owned()
                } else {
                    format!("{path}.{k}")
                };
                collect_leaves(v, child, out);
            }
        }
        Node::List(l) => {
            for (i, v) in l.iter().enumerate() {
                collect_leaves(v, format!("{path}[{i}]"), out);
            }
        }
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// # Panics
    ///
    /// If this isn't an object or has no such key.
    fn index(&self, key: &str) -> &Node {
        self.get(key)
            .unwrap_or_else(|| panic!("No field {key:?} in {self:?}"))
    }
}

impl Index<usize> for Node {
    type Output = Node;

    /// # Panics
    ///
    /// If this isn't a list or the index is out of range.
    fn index(&self, index: usize) -> &Node {
        self.at(index)
            .unwrap_or_else(|| panic!("No element {index} in {self:?}"))
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(t) => t.value.serialize(serializer),
            Node::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (k, v) in o.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Node::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for v in l {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
        }
    }
}
