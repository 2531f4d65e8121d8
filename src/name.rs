//! The distinguished name data model and its structural validation.

use std::{fmt, slice};

use const_oid::ObjectIdentifier;

use crate::{Attribute, AttributeType, Encoding, Error, Result};

/// An attribute value: decoded text together with the ASN.1 string type it
/// is encoded with.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AttributeValue {
    encoding: Encoding,
    value: String,
}

impl AttributeValue {
    /// Create a new attribute value.
    pub fn new(encoding: Encoding, value: impl Into<String>) -> Self {
        Self {
            encoding,
            value: value.into(),
        }
    }

    /// A PrintableString value.
    pub fn printable(value: impl Into<String>) -> Self {
        Self::new(Encoding::PrintableString, value)
    }

    /// A UTF8String value.
    pub fn utf8(value: impl Into<String>) -> Self {
        Self::new(Encoding::Utf8String, value)
    }

    /// An IA5String value.
    pub fn ia5(value: impl Into<String>) -> Self {
        Self::new(Encoding::Ia5String, value)
    }

    /// Get the string encoding of this value.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Get the text of this value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The raw text, without any escaping.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A single attribute of an RDN.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AttributeTypeAndValue {
    attribute: Attribute,
    value: AttributeValue,
}

impl AttributeTypeAndValue {
    /// Create a new attribute.
    pub fn new(attribute: impl Into<Attribute>, value: AttributeValue) -> Self {
        Self {
            attribute: attribute.into(),
            value,
        }
    }

    /// Create an attribute identified by a dotted-decimal OID.
    pub fn generic(oid: &str, value: AttributeValue) -> Result<Self> {
        Ok(Self::new(Attribute::generic(oid)?, value))
    }

    /// Get the type of this attribute.
    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    /// Get the value of this attribute.
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }

    /// Get the effective OID of this attribute.
    pub fn oid(&self) -> ObjectIdentifier {
        self.attribute.oid()
    }

    /// Check that the value encoding is allowed for the attribute type.
    pub fn validate(&self) -> Result<()> {
        self.attribute.check_encoding(self.value.encoding)
    }
}

/// A relative distinguished name (RDN): a set of one or more attributes.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    attributes: Vec<AttributeTypeAndValue>,
}

impl RelativeDistinguishedName {
    /// Create a new RDN. An RDN without attributes fails validation.
    pub fn new(attributes: Vec<AttributeTypeAndValue>) -> Self {
        Self { attributes }
    }

    /// Create a single-valued RDN.
    pub fn single(attribute: AttributeTypeAndValue) -> Self {
        Self::new(vec![attribute])
    }

    /// Get the attributes of this RDN.
    pub fn attributes(&self) -> &[AttributeTypeAndValue] {
        &self.attributes
    }

    /// Iterate over the attributes of this RDN.
    pub fn iter(&self) -> slice::Iter<'_, AttributeTypeAndValue> {
        self.attributes.iter()
    }

    /// Number of attributes in this RDN.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether this RDN has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether this RDN holds more than one attribute.
    pub fn is_multi_valued(&self) -> bool {
        self.attributes.len() > 1
    }

    /// Validate every attribute of this RDN.
    pub fn validate(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(Error::EmptyRdn);
        }
        for (index, atv) in self.attributes.iter().enumerate() {
            atv.validate().map_err(|e| Error::Attribute {
                index,
                source: Box::new(e),
            })?;
        }

        Ok(())
    }

    // Whether the attribute OIDs of this RDN are exactly `oids`, as a
    // multiset.
    fn matches_oids(&self, oids: &[ObjectIdentifier]) -> bool {
        if self.attributes.len() != oids.len() {
            return false;
        }
        let mut rest: Vec<ObjectIdentifier> = self.attributes.iter().map(|x| x.oid()).collect();
        for oid in oids {
            match rest.iter().position(|x| x == oid) {
                Some(i) => {
                    rest.swap_remove(i);
                }
                None => return false,
            }
        }

        rest.is_empty()
    }
}

impl From<AttributeTypeAndValue> for RelativeDistinguishedName {
    fn from(attribute: AttributeTypeAndValue) -> Self {
        Self::single(attribute)
    }
}

impl<'a> IntoIterator for &'a RelativeDistinguishedName {
    type Item = &'a AttributeTypeAndValue;
    type IntoIter = slice::Iter<'a, AttributeTypeAndValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A distinguished name (DN).
///
/// DNs are an ordered sequence of relative distinguished names (RDNs),
/// stored in ASN.1 `RDNSequence` order: the first RDN is the one closest to
/// the root. The empty DN is valid.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct DistinguishedName {
    rdns: Vec<RelativeDistinguishedName>,
}

impl DistinguishedName {
    /// Create a new DN from its RDNs, in `RDNSequence` order.
    pub fn new(rdns: Vec<RelativeDistinguishedName>) -> Self {
        Self { rdns }
    }

    /// Append an RDN.
    pub fn push(&mut self, rdn: impl Into<RelativeDistinguishedName>) {
        self.rdns.push(rdn.into());
    }

    /// Get the RDNs of this DN.
    pub fn rdns(&self) -> &[RelativeDistinguishedName] {
        &self.rdns
    }

    /// Iterate over the RDNs of this DN.
    pub fn iter(&self) -> slice::Iter<'_, RelativeDistinguishedName> {
        self.rdns.iter()
    }

    /// Number of RDNs in this DN.
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// Whether this is the empty DN.
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Get the RDN at `index`.
    pub fn rdn(&self, index: usize) -> Result<&RelativeDistinguishedName> {
        self.rdns.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.rdns.len(),
        })
    }

    /// A new DN with the order of the RDNs reversed.
    pub fn reversed(&self) -> Self {
        Self {
            rdns: self.rdns.iter().rev().cloned().collect(),
        }
    }

    /// Find the value of the first attribute of the given type.
    ///
    /// Generic attributes whose OID is well-known are matched too.
    pub fn find(&self, ty: AttributeType) -> Option<&str> {
        self.rdns
            .iter()
            .flat_map(|rdn| rdn.iter())
            .find_map(|x| {
                if x.attribute().resolve() == Some(ty) {
                    Some(x.value().value())
                } else {
                    None
                }
            })
    }

    /// Find the RDNs whose attribute OIDs are exactly `oids`.
    ///
    /// An RDN is a set, so the order of `oids` is ignored, but every OID
    /// must be matched by a distinct attribute and vice versa.
    pub fn rdns_matching_oids(&self, oids: &[ObjectIdentifier]) -> Vec<&RelativeDistinguishedName> {
        if oids.is_empty() {
            return Vec::new();
        }

        self.rdns.iter().filter(|x| x.matches_oids(oids)).collect()
    }

    /// Validate every RDN of this DN.
    ///
    /// The first failure is returned, wrapped with the index of the RDN and
    /// of the attribute it was found in.
    pub fn validate(&self) -> Result<()> {
        for (index, rdn) in self.rdns.iter().enumerate() {
            rdn.validate().map_err(|e| Error::Rdn {
                index,
                source: Box::new(e),
            })?;
        }

        Ok(())
    }
}

impl From<Vec<RelativeDistinguishedName>> for DistinguishedName {
    fn from(rdns: Vec<RelativeDistinguishedName>) -> Self {
        Self::new(rdns)
    }
}

impl FromIterator<RelativeDistinguishedName> for DistinguishedName {
    fn from_iter<I: IntoIterator<Item = RelativeDistinguishedName>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DistinguishedName {
    type Item = &'a RelativeDistinguishedName;
    type IntoIter = slice::Iter<'a, RelativeDistinguishedName>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
