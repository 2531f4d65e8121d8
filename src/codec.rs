//! DER encoding and decoding of distinguished names.
//!
//! ```text
//! Name ::= RDNSequence
//! RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
//! RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
//! AttributeTypeAndValue ::= SEQUENCE {
//!     type     AttributeType,
//!     value    AttributeValue
//! }
//! ```
//!
//! <https://datatracker.ietf.org/doc/html/rfc5280#appendix-A.1>

use const_oid::ObjectIdentifier;
use der::{
    asn1::{AnyRef, Ia5StringRef, Utf8StringRef},
    Decode, DecodeValue, Encode, EncodeValue, ErrorKind, FixedTag, Header, Length, Reader,
    Sequence, Tag, Tagged, Writer,
};

use crate::{
    Attribute, AttributeTypeAndValue, AttributeValue, DistinguishedName, Encoding, Error,
    RelativeDistinguishedName, Result,
};

// The value is kept as its complete TLV so that string types the `der` crate
// has no tag for (UniversalString) still decode up to the point where they
// can be reported as unsupported.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RawAttributeTypeAndValue {
    oid: ObjectIdentifier,
    value: Vec<u8>,
}

impl<'a> DecodeValue<'a> for RawAttributeTypeAndValue {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let oid = ObjectIdentifier::decode(reader)?;
            let remaining = reader.remaining_len();
            let value = reader.read_vec(remaining)?;
            if value.is_empty() {
                return Err(ErrorKind::Length { tag: Tag::Sequence }.into());
            }

            Ok(Self { oid, value })
        })
    }
}

impl EncodeValue for RawAttributeTypeAndValue {
    fn value_len(&self) -> der::Result<Length> {
        self.oid.encoded_len()? + Length::try_from(self.value.len())?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.oid.encode(writer)?;
        writer.write(&self.value)
    }
}

impl Sequence<'_> for RawAttributeTypeAndValue {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RawRelativeDistinguishedName(Vec<RawAttributeTypeAndValue>);

impl<'a> DecodeValue<'a> for RawRelativeDistinguishedName {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut atvs = Vec::new();
            while !reader.is_finished() {
                atvs.push(RawAttributeTypeAndValue::decode(reader)?);
            }
            Ok(Self(atvs))
        })
    }
}

impl EncodeValue for RawRelativeDistinguishedName {
    fn value_len(&self) -> der::Result<Length> {
        let mut len = Length::ZERO;
        for atv in &self.0 {
            len = (len + atv.encoded_len()?)?;
        }
        Ok(len)
    }

    // X.690 11.6: the members of a SET OF are ordered by their encodings,
    // compared as octet strings.
    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        let mut encoded = self
            .0
            .iter()
            .map(|atv| atv.to_der())
            .collect::<der::Result<Vec<_>>>()?;
        encoded.sort();
        for atv in &encoded {
            writer.write(atv)?;
        }
        Ok(())
    }
}

impl FixedTag for RawRelativeDistinguishedName {
    const TAG: Tag = Tag::Set;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct RawName(Vec<RawRelativeDistinguishedName>);

impl<'a> DecodeValue<'a> for RawName {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let mut rdns = Vec::new();
            while !reader.is_finished() {
                rdns.push(RawRelativeDistinguishedName::decode(reader)?);
            }
            Ok(Self(rdns))
        })
    }
}

impl EncodeValue for RawName {
    fn value_len(&self) -> der::Result<Length> {
        let mut len = Length::ZERO;
        for rdn in &self.0 {
            len = (len + rdn.encoded_len()?)?;
        }
        Ok(len)
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        for rdn in &self.0 {
            rdn.encode(writer)?;
        }
        Ok(())
    }
}

impl FixedTag for RawName {
    const TAG: Tag = Tag::Sequence;
}

/// Whether `byte` belongs to the PrintableString repertoire (X.680 41.4).
///
/// `*` is accepted as well since wildcard certificate names carry it. `&` is
/// only tolerated when reading, some issuers emit it.
pub(crate) fn is_printable(byte: u8, allow_ampersand: bool) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b' ' | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b'-'
                | b'.'
                | b'/'
                | b':'
                | b'='
                | b'?'
        )
        || (allow_ampersand && byte == b'&')
}

fn encode_printable(text: &str) -> der::Result<Vec<u8>> {
    let tag = Encoding::PrintableString.tag();
    if !text.bytes().all(|b| is_printable(b, false)) {
        return Err(tag.value_error());
    }

    AnyRef::new(tag, text.as_bytes())?.to_der()
}

fn decode_printable(bytes: &[u8]) -> der::Result<String> {
    let tag = Encoding::PrintableString.tag();
    let any = AnyRef::from_der(bytes)?;
    any.tag().assert_eq(tag)?;
    if !any.value().iter().all(|&b| is_printable(b, true)) {
        return Err(tag.value_error());
    }

    // The repertoire is ASCII
    Ok(any.value().iter().copied().map(char::from).collect())
}

/// Encode `value` as a complete DER string primitive.
fn encode_string(value: &AttributeValue) -> Result<Vec<u8>> {
    let text = value.value();
    match value.encoding() {
        Encoding::PrintableString => encode_printable(text),
        Encoding::Utf8String => Utf8StringRef::new(text).and_then(|s| s.to_der()),
        Encoding::Ia5String => Ia5StringRef::new(text).and_then(|s| s.to_der()),
    }
    .map_err(|source| Error::PrimitiveEncoding {
        encoding: value.encoding(),
        source,
    })
}

/// Decode a complete DER string primitive. The tag decides the encoding;
/// there is no fallback for other string types.
pub(crate) fn decode_string(bytes: &[u8]) -> Result<AttributeValue> {
    let tag = *bytes
        .first()
        .ok_or(Error::MalformedPrimitive(ErrorKind::Incomplete {
            expected_len: Length::ONE,
            actual_len: Length::ZERO,
        }
        .into()))?;
    let encoding = Encoding::from_tag_byte(tag)?;
    let value = match encoding {
        Encoding::PrintableString => decode_printable(bytes),
        Encoding::Utf8String => Utf8StringRef::from_der(bytes).map(|s| s.as_str().to_owned()),
        Encoding::Ia5String => Ia5StringRef::from_der(bytes).map(|s| s.as_str().to_owned()),
    }
    .map_err(Error::MalformedPrimitive)?;

    Ok(AttributeValue::new(encoding, value))
}

impl TryFrom<&AttributeTypeAndValue> for RawAttributeTypeAndValue {
    type Error = Error;

    fn try_from(atv: &AttributeTypeAndValue) -> Result<Self> {
        Ok(Self {
            oid: atv.oid(),
            value: encode_string(atv.value())?,
        })
    }
}

impl TryFrom<&RelativeDistinguishedName> for RawRelativeDistinguishedName {
    type Error = Error;

    fn try_from(rdn: &RelativeDistinguishedName) -> Result<Self> {
        rdn.iter()
            .enumerate()
            .map(|(index, atv)| {
                RawAttributeTypeAndValue::try_from(atv).map_err(|e| Error::Attribute {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl TryFrom<&DistinguishedName> for RawName {
    type Error = Error;

    fn try_from(dn: &DistinguishedName) -> Result<Self> {
        dn.iter()
            .enumerate()
            .map(|(index, rdn)| {
                RawRelativeDistinguishedName::try_from(rdn).map_err(|e| Error::Rdn {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl TryFrom<RawAttributeTypeAndValue> for AttributeTypeAndValue {
    type Error = Error;

    fn try_from(raw: RawAttributeTypeAndValue) -> Result<Self> {
        let value = decode_string(&raw.value)?;

        Ok(Self::new(Attribute::from_oid(raw.oid), value))
    }
}

impl TryFrom<RawRelativeDistinguishedName> for RelativeDistinguishedName {
    type Error = Error;

    fn try_from(raw: RawRelativeDistinguishedName) -> Result<Self> {
        raw.0
            .into_iter()
            .enumerate()
            .map(|(index, atv)| {
                AttributeTypeAndValue::try_from(atv).map_err(|e| Error::Attribute {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl TryFrom<RawName> for DistinguishedName {
    type Error = Error;

    fn try_from(raw: RawName) -> Result<Self> {
        raw.0
            .into_iter()
            .enumerate()
            .map(|(index, rdn)| {
                RelativeDistinguishedName::try_from(rdn).map_err(|e| Error::Rdn {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl DistinguishedName {
    /// Encode this DN as a DER `RDNSequence`.
    ///
    /// The DN is validated first; nothing is encoded if validation fails.
    /// Multi-valued RDNs are written in DER canonical order, which may
    /// differ from the order of [`RelativeDistinguishedName::attributes`].
    pub fn to_der(&self) -> Result<Vec<u8>> {
        if let Err(e) = self.validate() {
            log::debug!("refusing to encode invalid DN: {e}");
            return Err(e);
        }

        let bytes = RawName::try_from(self)?
            .to_der()
            .map_err(Error::MalformedDer)?;
        log::trace!("encoded DN with {} RDNs into {} bytes", self.len(), bytes.len());

        Ok(bytes)
    }

    /// Decode a DER `RDNSequence`.
    ///
    /// The whole input must be consumed. The decoded DN is validated before
    /// it is returned.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let raw = RawName::from_der(bytes).map_err(Error::MalformedDer)?;
        let dn = Self::try_from(raw)?;
        if let Err(e) = dn.validate() {
            log::debug!("rejecting decoded DN: {e}");
            return Err(e);
        }
        log::trace!("decoded DN with {} RDNs from {} bytes", dn.len(), bytes.len());

        Ok(dn)
    }

    /// Decode a hex-encoded DER `RDNSequence`.
    pub fn from_der_hex(hex: &str) -> Result<Self> {
        Self::from_der(&hex::decode(hex.trim())?)
    }
}
