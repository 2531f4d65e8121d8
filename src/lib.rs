//! Typed X.500 distinguished names as used in X.509 certificates, CRLs and
//! certificate requests.
//!
//! A [`DistinguishedName`] converts to and from its DER encoding
//! ([`DistinguishedName::to_der`], [`DistinguishedName::from_der`]) and to
//! and from the RFC 4514 string format ([`DistinguishedName::to_rfc4514_string`],
//! [`str::parse`]). Both directions validate that every attribute value uses
//! a string encoding its attribute type allows:
//!
//! | Attribute type | Allowed encodings |
//! |---|---|
//! | country name, dnQualifier, serial number | PrintableString |
//! | email address, domain component | IA5String |
//! | any other well-known type | PrintableString or UTF8String |
//! | any other OID | PrintableString, UTF8String or IA5String |
//!
//! <https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4>

use std::{result, string::FromUtf8Error};

use const_oid::ObjectIdentifier;
use derive_more::{Display, Error, From};

mod attribute;
mod codec;
mod name;
mod rfc4514;


pub use attribute::{AllowedEncodings, Attribute, AttributeType, Encoding};
pub use name::{
    AttributeTypeAndValue, AttributeValue, DistinguishedName, RelativeDistinguishedName,
};
pub use rfc4514::{escape_value, FormatOptions, HashEscaping};

/// Possible errors when building, encoding, decoding or parsing
/// distinguished names.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Found a numeric attribute type code outside the supported set.
    #[display(fmt = "unsupported attribute type: {_0}")]
    #[from(ignore)]
    UnsupportedAttributeType(#[error(not(source))] u32),
    /// Found an OID that is not one of the well-known attribute types.
    #[display(fmt = "{_0} is not a supported attribute type OID")]
    #[from(ignore)]
    UnsupportedOid(#[error(not(source))] ObjectIdentifier),
    /// Found a string that is not a dotted-decimal OID.
    #[display(fmt = "malformed OID: {_0:?}")]
    #[from(ignore)]
    MalformedOid(#[error(not(source))] String),
    /// Found a numeric encoding code outside the supported set.
    #[display(fmt = "unsupported string encoding: {_0}")]
    #[from(ignore)]
    UnsupportedEncoding(#[error(not(source))] u32),
    /// Found an attribute value whose DER tag is not PrintableString,
    /// UTF8String or IA5String.
    #[display(fmt = "attribute value has unsupported string tag {_0:#04x}")]
    #[from(ignore)]
    UnsupportedStringEncoding(#[error(not(source))] u8),
    /// Found a value encoding its attribute type does not allow.
    #[display(fmt = "{attribute}'s value should be {allowed}, not {encoding}")]
    #[from(ignore)]
    EncodingMismatch {
        attribute: Attribute,
        encoding: Encoding,
        allowed: AllowedEncodings,
    },
    /// Found an RDN without attributes.
    #[display(fmt = "RDN should have at least one attribute")]
    #[from(ignore)]
    EmptyRdn,
    /// The input is not a DER `RDNSequence`, or has trailing data.
    #[display(fmt = "malformed DER name: {_0}")]
    #[from(ignore)]
    MalformedDer(der::Error),
    /// An attribute value could not be decoded under its tag.
    #[display(fmt = "malformed attribute value: {_0}")]
    #[from(ignore)]
    MalformedPrimitive(der::Error),
    /// An attribute value cannot be represented in its encoding.
    #[display(fmt = "cannot encode attribute value as {encoding}: {source}")]
    #[from(ignore)]
    PrimitiveEncoding {
        encoding: Encoding,
        source: der::Error,
    },
    /// An RDN index is out of range.
    #[display(fmt = "RDN index {index} out of range for DN of length {len}")]
    #[from(ignore)]
    IndexOutOfRange { index: usize, len: usize },
    /// An error in the RDN at `index`.
    #[display(fmt = "RDN {index}: {source}")]
    #[from(ignore)]
    Rdn { index: usize, source: Box<Error> },
    /// An error in the attribute at `index` of an RDN.
    #[display(fmt = "attribute {index}: {source}")]
    #[from(ignore)]
    Attribute { index: usize, source: Box<Error> },
    /// Found an unknown attribute type name.
    #[display(fmt = "invalid attribute type: {_0}")]
    #[from(ignore)]
    InvalidType(#[error(not(source))] String),
    /// Found a character in a position where it is invalid.
    #[display(fmt = "unexpected character: {_0:?}")]
    #[from(ignore)]
    UnexpectedCharacter(#[error(not(source))] char),
    /// String ended unexpectedly.
    #[display(fmt = "unexpected EOF")]
    #[from(ignore)]
    UnexpectedEof,
    /// Could not decode a hex string.
    Hex(hex::FromHexError),
    /// Found a non-UTF-8 string.
    Utf8(FromUtf8Error),
}

impl Error {
    /// The innermost error, with the RDN and attribute positions stripped.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Rdn { source, .. } | Self::Attribute { source, .. } => source.root_cause(),
            _ => self,
        }
    }
}

/// Result type of this crate.
pub type Result<T> = result::Result<T, Error>;
