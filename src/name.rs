use core::fmt;
use core::num::NonZeroU16;

/// An ordered sequence of typed components identifying a data object.
///
/// Names compare lexicographically component by component, and components
/// compare by type then by value bytes. Under this total order every name
/// sharing a given prefix falls into the contiguous half-open range
/// `[prefix, prefix.successor())`, which is what the content store's index
/// relies on for prefix matching.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn from_components(components: Vec<NameComponent>) -> Self {
        Self { components }
    }

    /// Parses a slash-separated URI such as `/a/b/1`. Every segment becomes a
    /// generic component of its raw UTF-8 bytes; `%XX` escapes are decoded.
    /// `/` is the empty name. Empty segments are rejected.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix('/')?;
        if rest.is_empty() {
            return Some(Self::new());
        }
        let mut components = Vec::new();
        for segment in rest.split('/') {
            if segment.is_empty() {
                return None;
            }
            components.push(NameComponent::generic(&unescape(segment)?));
        }
        Some(Self { components })
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    pub fn components(&self) -> impl Iterator<Item = &NameComponent> {
        self.components.iter()
    }

    pub fn push(&mut self, component: NameComponent) {
        self.components.push(component);
    }

    /// The first `count` components, or the whole name if shorter.
    pub fn prefix(&self, count: usize) -> Name {
        let count = count.min(self.components.len());
        Name {
            components: self.components[..count].to_vec(),
        }
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.len() >= self.components.len()
            && self.components == other.components[..self.components.len()]
    }

    /// The smallest name strictly greater than every name having `self` as a
    /// prefix. Appending a zero byte to the last component yields its
    /// immediate successor in the component order, so the result is the
    /// exclusive upper bound of the prefix range. `None` for the empty name,
    /// whose range is unbounded above.
    pub fn successor(&self) -> Option<Name> {
        let last = self.components.last()?;
        let mut bytes = Vec::with_capacity(last.bytes.len() + 1);
        bytes.extend_from_slice(&last.bytes);
        bytes.push(0);
        let mut components = self.components.clone();
        components.pop();
        components.push(NameComponent {
            typ: last.typ,
            bytes: bytes.into_boxed_slice(),
        });
        Some(Name { components })
    }

    /// Canonical string form, used as the key of the public-name set.
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// One name component: a type code and opaque value bytes.
///
/// The derived ordering (type first, then bytes) keeps implicit-digest
/// components, which carry the smallest type code, ahead of generic siblings,
/// so exact full names sort before any descendant under the same prefix.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameComponent {
    typ: NonZeroU16,
    bytes: Box<[u8]>,
}

#[derive(Copy, Clone)]
pub enum NameComponentType {
    Generic,
    ImplicitSha256Digest,
    ParameterSha256Digest,
    Other(NonZeroU16),
}

const NAME_COMPONENT_TYPE_GENERIC: u16 = 8;
const NAME_COMPONENT_TYPE_IMPLICIT_SHA256: u16 = 1;
const NAME_COMPONENT_TYPE_PARAMETER_SHA256: u16 = 2;

impl From<NonZeroU16> for NameComponentType {
    fn from(value: NonZeroU16) -> Self {
        match value.get() {
            NAME_COMPONENT_TYPE_GENERIC => NameComponentType::Generic,
            NAME_COMPONENT_TYPE_IMPLICIT_SHA256 => NameComponentType::ImplicitSha256Digest,
            NAME_COMPONENT_TYPE_PARAMETER_SHA256 => NameComponentType::ParameterSha256Digest,
            v => NameComponentType::Other(v.try_into().unwrap()),
        }
    }
}

impl From<NameComponentType> for NonZeroU16 {
    fn from(value: NameComponentType) -> Self {
        match value {
            NameComponentType::Generic => NAME_COMPONENT_TYPE_GENERIC.try_into().unwrap(),
            NameComponentType::ImplicitSha256Digest => {
                NAME_COMPONENT_TYPE_IMPLICIT_SHA256.try_into().unwrap()
            }
            NameComponentType::ParameterSha256Digest => {
                NAME_COMPONENT_TYPE_PARAMETER_SHA256.try_into().unwrap()
            }
            NameComponentType::Other(v) => v,
        }
    }
}

impl NameComponent {
    pub fn new(typ: NameComponentType, bytes: &[u8]) -> Self {
        Self {
            typ: typ.into(),
            bytes: Box::from(bytes),
        }
    }

    pub fn generic(bytes: &[u8]) -> Self {
        Self::new(NameComponentType::Generic, bytes)
    }

    pub fn component_type(&self) -> NameComponentType {
        self.typ.into()
    }

    pub fn typ(&self) -> NonZeroU16 {
        self.typ
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component_type() {
            NameComponentType::Generic => escape(f, &self.bytes),
            NameComponentType::ImplicitSha256Digest => {
                write!(f, "sha256digest=")?;
                for b in self.bytes.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            NameComponentType::ParameterSha256Digest => {
                write!(f, "params-sha256=")?;
                for b in self.bytes.iter() {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            NameComponentType::Other(t) => {
                write!(f, "{}=", t)?;
                escape(f, &self.bytes)
            }
        }
    }
}

impl fmt::Debug for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn escape(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "%{:02X}", b)?;
        }
    }
    Ok(())
}

fn unescape(segment: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(segment.len());
    let mut bytes = segment.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next()?;
            let lo = bytes.next()?;
            let hex = [hi, lo];
            let hex = core::str::from_utf8(&hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
        } else {
            out.push(b);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::from_uri(uri).unwrap()
    }

    #[test]
    fn test_uri_round_trip() {
        assert_eq!(name("/").to_uri(), "/");
        assert_eq!(name("/a/b/1").to_uri(), "/a/b/1");
        assert_eq!(name("/a%2Fb").to_uri(), "/a%2Fb");
        assert!(Name::from_uri("no-slash").is_none());
        assert!(Name::from_uri("/a//b").is_none());
    }

    #[test]
    fn test_prefix_relations() {
        let root = name("/");
        let a = name("/a");
        let ab = name("/a/b");
        assert!(root.is_prefix_of(&a));
        assert!(a.is_prefix_of(&a));
        assert!(a.is_prefix_of(&ab));
        assert!(!ab.is_prefix_of(&a));
        assert!(!name("/b").is_prefix_of(&ab));
        assert_eq!(ab.prefix(1), a);
        assert_eq!(ab.prefix(5), ab);
    }

    #[test]
    fn test_ordering_puts_prefix_first() {
        let a = name("/a");
        let ab = name("/a/b");
        let b = name("/b");
        assert!(a < ab);
        assert!(ab < b);
    }

    #[test]
    fn test_digest_component_sorts_before_generic() {
        // An exact full name (digest next) must sort before any descendant
        // with a generic next component.
        let mut exact = name("/a");
        exact.push(NameComponent::new(
            NameComponentType::ImplicitSha256Digest,
            &[0xFF; 32],
        ));
        let descendant = name("/a/b");
        assert!(exact < descendant);
    }

    #[test]
    fn test_successor_bounds_prefix_range() {
        let a = name("/a");
        let succ = a.successor().unwrap();
        // Everything prefixed by /a sorts below the successor...
        assert!(a < succ);
        assert!(name("/a/b") < succ);
        assert!(name("/a/%FF%FF") < succ);
        // ...and nothing between /a and its successor escapes the prefix.
        assert!(name("/b") > succ);
        assert!(!a.is_prefix_of(&succ));
        assert!(name("/").successor().is_none());
    }
}
