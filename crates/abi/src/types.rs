//! ABI type-string parsing and the recursive type descriptor.
//!
//! Every [`TypeDescriptor`] is a self-contained, owned tree: array element
//! types are boxed and owned by their parent, there is no shared/pointer
//! aliasing between nodes.

use std::fmt;

use thiserror::Error;

/// The fundamental shape of an ABI type, independent of width or nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Uint,
    /// Solidity `fixedMxN`; encoded identically to `int256` (the in-memory
    /// representation is the scaled integer, two's-complement, 256 bits),
    /// only the canonical signature string differs.
    Fixed,
    Bool,
    Address,
    String,
    FixedBytes,
    DynBytes,
    Function,
    FixedArray,
    DynArray,
}

/// An immutable, parsed ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    kind: Kind,
    width: u16,
    elem: Option<Box<TypeDescriptor>>,
    arity: i64,
    canonical: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeParseError {
    #[error("empty type string")]
    Empty,
    #[error("unknown base type `{0}`")]
    UnknownBase(String),
    #[error("invalid width in type `{0}`")]
    InvalidWidth(String),
    #[error("malformed array suffix in type `{0}`")]
    MalformedArraySuffix(String),
}

impl TypeDescriptor {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn elem(&self) -> Option<&TypeDescriptor> {
        self.elem.as_deref()
    }

    /// Fixed cardinality for `fixedArray`, `-1` for `dynArray`/`string`/`dynBytes`.
    pub fn arity(&self) -> i64 {
        self.arity
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// `requiresHead` from the design: true for `string`, `bytes`, `T[]`,
    /// and any `T[N]` whose element is itself dynamic.
    pub fn is_dynamic(&self) -> bool {
        match self.kind {
            Kind::String | Kind::DynBytes | Kind::DynArray => true,
            Kind::FixedArray => self.elem.as_ref().is_some_and(|e| e.is_dynamic()),
            _ => false,
        }
    }

    pub fn requires_head(&self) -> bool {
        self.is_dynamic()
    }

    pub fn parse(input: &str) -> Result<Self, TypeParseError> {
        parse_type(input)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

fn parse_type(input: &str) -> Result<TypeDescriptor, TypeParseError> {
    if input.is_empty() {
        return Err(TypeParseError::Empty);
    }
    let (base, suffixes) = split_array_suffixes(input)?;
    let mut descriptor = parse_base(base)?;
    for suffix in suffixes {
        descriptor = match suffix {
            None => wrap_dyn_array(descriptor),
            Some(n) => wrap_fixed_array(descriptor, n),
        };
    }
    Ok(descriptor)
}

/// Peels `[...]` suffixes off the end of `input`, innermost-syntax-first.
/// Suffixes are returned left-to-right as written; the caller applies them
/// in that order, so the rightmost written suffix ends up outermost.
fn split_array_suffixes(input: &str) -> Result<(&str, Vec<Option<u64>>), TypeParseError> {
    let mut rest = input;
    let mut suffixes = Vec::new();
    while rest.ends_with(']') {
        let open = rest
            .rfind('[')
            .ok_or_else(|| TypeParseError::MalformedArraySuffix(input.to_owned()))?;
        let inner = &rest[open + 1..rest.len() - 1];
        let n = if inner.is_empty() {
            None
        } else {
            Some(
                inner
                    .parse::<u64>()
                    .map_err(|_| TypeParseError::MalformedArraySuffix(input.to_owned()))?,
            )
        };
        suffixes.push(n);
        rest = &rest[..open];
    }
    suffixes.reverse();
    if rest.is_empty() {
        return Err(TypeParseError::MalformedArraySuffix(input.to_owned()));
    }
    Ok((rest, suffixes))
}

fn wrap_dyn_array(elem: TypeDescriptor) -> TypeDescriptor {
    let canonical = format!("{}[]", elem.canonical);
    TypeDescriptor { kind: Kind::DynArray, width: 0, elem: Some(Box::new(elem)), arity: -1, canonical }
}

fn wrap_fixed_array(elem: TypeDescriptor, n: u64) -> TypeDescriptor {
    let canonical = format!("{}[{n}]", elem.canonical);
    TypeDescriptor { kind: Kind::FixedArray, width: 0, elem: Some(Box::new(elem)), arity: n as i64, canonical }
}

fn parse_base(base: &str) -> Result<TypeDescriptor, TypeParseError> {
    if let Some(rest) = base.strip_prefix("uint") {
        let width = parse_int_width(rest, base)?;
        return Ok(TypeDescriptor { kind: Kind::Uint, width, elem: None, arity: 0, canonical: format!("uint{width}") });
    }
    if let Some(rest) = base.strip_prefix("int") {
        let width = parse_int_width(rest, base)?;
        return Ok(TypeDescriptor { kind: Kind::Int, width, elem: None, arity: 0, canonical: format!("int{width}") });
    }
    if let Some(rest) = base.strip_prefix("fixed") {
        return parse_fixed_point(rest, base);
    }
    if base == "bool" {
        return Ok(TypeDescriptor { kind: Kind::Bool, width: 0, elem: None, arity: 0, canonical: "bool".into() });
    }
    if base == "address" {
        return Ok(TypeDescriptor { kind: Kind::Address, width: 0, elem: None, arity: 0, canonical: "address".into() });
    }
    if base == "string" {
        return Ok(TypeDescriptor { kind: Kind::String, width: 0, elem: None, arity: -1, canonical: "string".into() });
    }
    if base == "function" {
        return Ok(TypeDescriptor { kind: Kind::Function, width: 24, elem: None, arity: 0, canonical: "function".into() });
    }
    if let Some(rest) = base.strip_prefix("bytes") {
        if rest.is_empty() {
            return Ok(TypeDescriptor { kind: Kind::DynBytes, width: 0, elem: None, arity: -1, canonical: "bytes".into() });
        }
        let n: u16 = rest.parse().map_err(|_| TypeParseError::InvalidWidth(base.to_owned()))?;
        if n == 0 || n > 32 {
            return Err(TypeParseError::InvalidWidth(base.to_owned()));
        }
        return Ok(TypeDescriptor { kind: Kind::FixedBytes, width: n, elem: None, arity: 0, canonical: format!("bytes{n}") });
    }
    Err(TypeParseError::UnknownBase(base.to_owned()))
}

fn parse_int_width(rest: &str, whole: &str) -> Result<u16, TypeParseError> {
    if rest.is_empty() {
        return Ok(256);
    }
    let width: u16 = rest.parse().map_err(|_| TypeParseError::InvalidWidth(whole.to_owned()))?;
    if width == 0 || width > 256 || width % 8 != 0 {
        return Err(TypeParseError::InvalidWidth(whole.to_owned()));
    }
    Ok(width)
}

/// Parses the `Width "x" Width` tail of a `fixedMxN` base type. Bare
/// `fixed` defaults to `fixed128x18`, matching Solidity's default.
fn parse_fixed_point(rest: &str, whole: &str) -> Result<TypeDescriptor, TypeParseError> {
    if rest.is_empty() {
        return Ok(TypeDescriptor { kind: Kind::Fixed, width: 128, elem: None, arity: 0, canonical: "fixed128x18".into() });
    }
    let (m_str, n_str) = rest.split_once('x').ok_or_else(|| TypeParseError::InvalidWidth(whole.to_owned()))?;
    let m: u16 = m_str.parse().map_err(|_| TypeParseError::InvalidWidth(whole.to_owned()))?;
    let n: u16 = n_str.parse().map_err(|_| TypeParseError::InvalidWidth(whole.to_owned()))?;
    if m == 0 || m > 256 || m % 8 != 0 {
        return Err(TypeParseError::InvalidWidth(whole.to_owned()));
    }
    Ok(TypeDescriptor { kind: Kind::Fixed, width: m, elem: None, arity: 0, canonical: format!("fixed{m}x{n}") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_int_and_uint_default_to_256() {
        assert_eq!(TypeDescriptor::parse("uint").unwrap().canonical(), "uint256");
        assert_eq!(TypeDescriptor::parse("int").unwrap().canonical(), "int256");
    }

    #[test]
    fn bytes_without_width_is_dynamic() {
        let t = TypeDescriptor::parse("bytes").unwrap();
        assert_eq!(t.kind(), Kind::DynBytes);
        assert!(t.is_dynamic());
    }

    #[test]
    fn bytesn_is_static() {
        let t = TypeDescriptor::parse("bytes32").unwrap();
        assert_eq!(t.kind(), Kind::FixedBytes);
        assert!(!t.is_dynamic());
        assert!(TypeDescriptor::parse("bytes0").is_err());
        assert!(TypeDescriptor::parse("bytes33").is_err());
    }

    #[test]
    fn array_suffixes_associate_left_to_right_rightmost_outermost() {
        // uint256[2][] is a dynamic array of fixed-size arrays of uint256.
        let t = TypeDescriptor::parse("uint256[2][]").unwrap();
        assert_eq!(t.kind(), Kind::DynArray);
        assert_eq!(t.elem().unwrap().kind(), Kind::FixedArray);
        assert_eq!(t.elem().unwrap().arity(), 2);
        assert_eq!(t.canonical(), "uint256[2][]");
    }

    #[test]
    fn fixed_array_of_dynamic_elements_is_dynamic() {
        let t = TypeDescriptor::parse("string[2]").unwrap();
        assert!(t.is_dynamic(), "string[2] must be dynamic: element is dynamic");
    }

    #[test]
    fn fixed_array_of_static_elements_is_static() {
        let t = TypeDescriptor::parse("bytes3[2]").unwrap();
        assert!(!t.is_dynamic());
    }

    #[test]
    fn unknown_base_errors() {
        assert!(matches!(TypeDescriptor::parse("frobnicate"), Err(TypeParseError::UnknownBase(_))));
    }

    #[test]
    fn function_is_fixed_24_bytes() {
        let t = TypeDescriptor::parse("function").unwrap();
        assert_eq!(t.width(), 24);
        assert!(!t.is_dynamic());
    }

    #[test]
    fn bare_fixed_defaults_to_128x18() {
        assert_eq!(TypeDescriptor::parse("fixed").unwrap().canonical(), "fixed128x18");
        assert_eq!(TypeDescriptor::parse("fixed64x10").unwrap().canonical(), "fixed64x10");
    }
}
