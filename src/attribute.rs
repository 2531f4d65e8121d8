//! Attribute type registry and the attribute/encoding compatibility rules.
//!
//! <https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4>

use const_oid::ObjectIdentifier;
use der::Tag;
use derive_more::Display;

use crate::{Error, Result};

const COUNTRY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const ORGANIZATION_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const ORGANIZATIONAL_UNIT: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
const DN_QUALIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.46");
const STATE_OR_PROVINCE_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
const LOCALITY_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const TITLE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.12");
const SURNAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.4");
const GIVEN_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.42");
const INITIALS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.43");
const PSEUDONYM: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.65");
const GENERATION_QUALIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.44");
const ELECTRONIC_MAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");
const DOMAIN_COMPONENT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");

/// A well-known attribute type.
///
/// Every variant has a fixed OID, a registered short name and a fixed set of
/// string encodings its values may use. Attributes identified by any other
/// OID are represented by [`Attribute::Generic`].
#[derive(Clone, Copy, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttributeType {
    /// Country name (2.5.4.6).
    CountryName,
    /// Organization name (2.5.4.10).
    OrganizationName,
    /// Organizational unit name (2.5.4.11).
    OrganizationalUnit,
    /// Distinguished name qualifier (2.5.4.46).
    DnQualifier,
    /// State or province name (2.5.4.8).
    StateOrProvinceName,
    /// Common name (2.5.4.3).
    CommonName,
    /// Serial number (2.5.4.5).
    SerialNumber,
    /// Locality name (2.5.4.7).
    LocalityName,
    /// Title (2.5.4.12).
    Title,
    /// Surname (2.5.4.4).
    Surname,
    /// Given name (2.5.4.42).
    GivenName,
    /// Initials (2.5.4.43).
    Initials,
    /// Pseudonym (2.5.4.65).
    Pseudonym,
    /// Generation qualifier (2.5.4.44).
    GenerationQualifier,
    /// PKCS #9 email address (1.2.840.113549.1.9.1).
    ElectronicMailAddress,
    /// Domain component (0.9.2342.19200300.100.1.25).
    DomainComponent,
}

impl AttributeType {
    /// All well-known attribute types, in legacy numeric code order.
    pub const ALL: [Self; 16] = [
        Self::CountryName,
        Self::OrganizationName,
        Self::OrganizationalUnit,
        Self::DnQualifier,
        Self::StateOrProvinceName,
        Self::CommonName,
        Self::SerialNumber,
        Self::LocalityName,
        Self::Title,
        Self::Surname,
        Self::GivenName,
        Self::Initials,
        Self::Pseudonym,
        Self::GenerationQualifier,
        Self::ElectronicMailAddress,
        Self::DomainComponent,
    ];

    /// The object identifier of this attribute type.
    pub const fn oid(self) -> ObjectIdentifier {
        match self {
            Self::CountryName => COUNTRY_NAME,
            Self::OrganizationName => ORGANIZATION_NAME,
            Self::OrganizationalUnit => ORGANIZATIONAL_UNIT,
            Self::DnQualifier => DN_QUALIFIER,
            Self::StateOrProvinceName => STATE_OR_PROVINCE_NAME,
            Self::CommonName => COMMON_NAME,
            Self::SerialNumber => SERIAL_NUMBER,
            Self::LocalityName => LOCALITY_NAME,
            Self::Title => TITLE,
            Self::Surname => SURNAME,
            Self::GivenName => GIVEN_NAME,
            Self::Initials => INITIALS,
            Self::Pseudonym => PSEUDONYM,
            Self::GenerationQualifier => GENERATION_QUALIFIER,
            Self::ElectronicMailAddress => ELECTRONIC_MAIL_ADDRESS,
            Self::DomainComponent => DOMAIN_COMPONENT,
        }
    }

    /// The short name (descriptor) registered for this attribute type.
    ///
    /// <https://www.iana.org/assignments/ldap-parameters/ldap-parameters.xhtml>
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::CountryName => "c",
            Self::OrganizationName => "o",
            Self::OrganizationalUnit => "ou",
            Self::DnQualifier => "dnQualifier",
            Self::StateOrProvinceName => "st",
            Self::CommonName => "cn",
            Self::SerialNumber => "serialNumber",
            Self::LocalityName => "L",
            Self::Title => "title",
            Self::Surname => "sn",
            Self::GivenName => "givenName",
            Self::Initials => "initials",
            Self::Pseudonym => "pseudonym",
            Self::GenerationQualifier => "generationQualifier",
            Self::ElectronicMailAddress => "email",
            Self::DomainComponent => "DC",
        }
    }

    /// The string encodings allowed for values of this attribute type.
    pub const fn allowed_encodings(self) -> AllowedEncodings {
        match self {
            Self::CountryName | Self::DnQualifier | Self::SerialNumber => {
                AllowedEncodings::Printable
            }
            Self::ElectronicMailAddress | Self::DomainComponent => AllowedEncodings::Ia5,
            Self::OrganizationName
            | Self::OrganizationalUnit
            | Self::StateOrProvinceName
            | Self::CommonName
            | Self::LocalityName
            | Self::Title
            | Self::Surname
            | Self::GivenName
            | Self::Initials
            | Self::Pseudonym
            | Self::GenerationQualifier => AllowedEncodings::PrintableOrUtf8,
        }
    }

    /// Look up the well-known attribute type identified by `oid`.
    pub fn from_oid(oid: &ObjectIdentifier) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.oid() == *oid)
            .ok_or(Error::UnsupportedOid(*oid))
    }

    /// Whether `oid` identifies one of the well-known attribute types.
    pub fn is_known_oid(oid: &ObjectIdentifier) -> bool {
        Self::ALL.iter().any(|ty| ty.oid() == *oid)
    }

    /// Check that values of this attribute type may use `encoding`.
    pub fn check_encoding(self, encoding: Encoding) -> Result<()> {
        let allowed = self.allowed_encodings();
        if allowed.permits(encoding) {
            Ok(())
        } else {
            Err(Error::EncodingMismatch {
                attribute: Attribute::Known(self),
                encoding,
                allowed,
            })
        }
    }
}

/// Convert a legacy numeric attribute type code (`1` = country name through
/// `16` = domain component).
impl TryFrom<u32> for AttributeType {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        code.checked_sub(1)
            .and_then(|i| Self::ALL.get(i as usize).copied())
            .ok_or(Error::UnsupportedAttributeType(code))
    }
}

/// The type of an attribute: either a well-known type or any other OID.
#[derive(Clone, Copy, Debug, Display, Hash, PartialEq, Eq)]
pub enum Attribute {
    /// One of the well-known attribute types.
    Known(AttributeType),
    /// Any attribute identified only by its OID.
    #[display(fmt = "Generic({_0})")]
    Generic(ObjectIdentifier),
}

impl Attribute {
    /// Create a generic attribute from a dotted-decimal OID.
    ///
    /// Every arc must be a non-empty run of ASCII digits.
    pub fn generic(oid: &str) -> Result<Self> {
        let well_formed = oid
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return Err(Error::MalformedOid(oid.to_owned()));
        }

        ObjectIdentifier::new(oid)
            .map(Self::Generic)
            .map_err(|_| Error::MalformedOid(oid.to_owned()))
    }

    /// Classify an OID, falling back to a generic attribute when it is not
    /// well-known.
    pub fn from_oid(oid: ObjectIdentifier) -> Self {
        match AttributeType::from_oid(&oid) {
            Ok(ty) => Self::Known(ty),
            Err(_) => Self::Generic(oid),
        }
    }

    /// The effective OID of this attribute.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::Known(ty) => ty.oid(),
            Self::Generic(oid) => *oid,
        }
    }

    /// The well-known type this attribute denotes, if any. A generic
    /// attribute whose OID is well-known resolves to that type.
    pub fn resolve(&self) -> Option<AttributeType> {
        match self {
            Self::Known(ty) => Some(*ty),
            Self::Generic(oid) => AttributeType::from_oid(oid).ok(),
        }
    }

    /// Check that values of this attribute may use `encoding`.
    ///
    /// A generic attribute whose OID is well-known has to satisfy both the
    /// generic rule and the rule of the matched type, so a restricted
    /// attribute cannot be encoded with a disallowed string type by
    /// declaring it generic.
    pub fn check_encoding(&self, encoding: Encoding) -> Result<()> {
        match self {
            Self::Known(ty) => ty.check_encoding(encoding),
            Self::Generic(oid) => {
                if let Ok(ty) = AttributeType::from_oid(oid) {
                    ty.check_encoding(encoding)?;
                }
                if AllowedEncodings::Any.permits(encoding) {
                    Ok(())
                } else {
                    Err(Error::EncodingMismatch {
                        attribute: *self,
                        encoding,
                        allowed: AllowedEncodings::Any,
                    })
                }
            }
        }
    }
}

impl From<AttributeType> for Attribute {
    fn from(ty: AttributeType) -> Self {
        Self::Known(ty)
    }
}

/// An ASN.1 string type usable for attribute values.
///
/// TeletexString, UniversalString and BMPString are not supported.
#[derive(Clone, Copy, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Encoding {
    /// PrintableString (tag 0x13).
    PrintableString,
    /// UTF8String (tag 0x0C).
    #[display(fmt = "UTF8String")]
    Utf8String,
    /// IA5String (tag 0x16).
    #[display(fmt = "IA5String")]
    Ia5String,
}

impl Encoding {
    /// The universal DER tag of this string type.
    pub const fn tag(self) -> Tag {
        match self {
            Self::PrintableString => Tag::PrintableString,
            Self::Utf8String => Tag::Utf8String,
            Self::Ia5String => Tag::Ia5String,
        }
    }

    /// Map a raw DER tag byte onto a supported string type.
    pub fn from_tag_byte(tag: u8) -> Result<Self> {
        match tag {
            0x13 => Ok(Self::PrintableString),
            0x0c => Ok(Self::Utf8String),
            0x16 => Ok(Self::Ia5String),
            _ => Err(Error::UnsupportedStringEncoding(tag)),
        }
    }
}

/// Convert a legacy numeric encoding code (`1` = PrintableString, `2` =
/// UTF8String, `3` = IA5String).
impl TryFrom<u32> for Encoding {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        match code {
            1 => Ok(Self::PrintableString),
            2 => Ok(Self::Utf8String),
            3 => Ok(Self::Ia5String),
            _ => Err(Error::UnsupportedEncoding(code)),
        }
    }
}

/// The set of string encodings an attribute type accepts.
#[derive(Clone, Copy, Debug, Display, Hash, PartialEq, Eq)]
pub enum AllowedEncodings {
    /// PrintableString only.
    #[display(fmt = "PrintableString")]
    Printable,
    /// PrintableString or UTF8String.
    #[display(fmt = "PrintableString or UTF8String")]
    PrintableOrUtf8,
    /// IA5String only.
    #[display(fmt = "IA5String")]
    Ia5,
    /// Any supported string encoding.
    #[display(fmt = "PrintableString, UTF8String or IA5String")]
    Any,
}

impl AllowedEncodings {
    /// Whether `encoding` belongs to this set.
    pub const fn permits(self, encoding: Encoding) -> bool {
        match self {
            Self::Printable => matches!(encoding, Encoding::PrintableString),
            Self::PrintableOrUtf8 => {
                matches!(encoding, Encoding::PrintableString | Encoding::Utf8String)
            }
            Self::Ia5 => matches!(encoding, Encoding::Ia5String),
            Self::Any => true,
        }
    }
}
