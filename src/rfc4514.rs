//! String representation of distinguished names:
//! <https://datatracker.ietf.org/doc/html/rfc4514>.

use std::{fmt, mem, str::FromStr};

use crate::{
    codec, AllowedEncodings, Attribute, AttributeType, AttributeTypeAndValue, AttributeValue,
    DistinguishedName, Encoding, Error, RelativeDistinguishedName, Result,
};

/// How number signs (`#`) in attribute values are escaped.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum HashEscaping {
    /// Escape every `#`, wherever it occurs in the value.
    ///
    /// This is what earlier releases produced. The output is still valid
    /// RFC 4514 and parses back to the same value.
    #[default]
    Anywhere,
    /// Escape `#` only when it is the first character of the value, as
    /// required by RFC 4514 section 2.4.
    Leading,
}

/// Options for the RFC 4514 formatter.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct FormatOptions {
    /// How to escape `#` characters.
    pub hash_escaping: HashEscaping,
}

impl FormatOptions {
    /// Options that follow RFC 4514 to the letter.
    pub fn strict() -> Self {
        Self {
            hash_escaping: HashEscaping::Leading,
        }
    }
}

/// Escape an attribute value:
/// <https://www.rfc-editor.org/rfc/rfc4514#section-2.4>.
pub fn escape_value(value: &str, hash_escaping: HashEscaping) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut res = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        let needs_escaping = match c {
            ' ' => i == 0 || i == last,
            '#' => i == 0 || hash_escaping == HashEscaping::Anywhere,
            '"' | '+' | ',' | ';' | '<' | '>' | '\\' | '\0' => true,
            _ => false,
        };
        if needs_escaping {
            res.push('\\');
        }
        res.push(c);
    }

    res
}

impl Attribute {
    /// The attribute type as it appears in the string representation: the
    /// upper-cased short name when the type is well-known, otherwise the
    /// dotted-decimal OID.
    pub fn rfc4514_name(&self) -> String {
        match self.resolve() {
            Some(ty) => ty.short_name().to_uppercase(),
            None => self.oid().to_string(),
        }
    }
}

impl AttributeTypeAndValue {
    /// Serialize into the RFC 4514 string format with default options.
    pub fn to_rfc4514_string(&self) -> String {
        self.to_rfc4514_string_with(&FormatOptions::default())
    }

    /// Serialize into the RFC 4514 string format.
    pub fn to_rfc4514_string_with(&self, options: &FormatOptions) -> String {
        let mut res = self.attribute().rfc4514_name();
        res.push('=');
        res += &escape_value(self.value().value(), options.hash_escaping);

        res
    }
}

impl RelativeDistinguishedName {
    /// Serialize into the RFC 4514 string format with default options.
    pub fn to_rfc4514_string(&self) -> String {
        self.to_rfc4514_string_with(&FormatOptions::default())
    }

    /// Serialize into the RFC 4514 string format.
    ///
    /// Attributes are written in their current order, separated by `+`.
    pub fn to_rfc4514_string_with(&self, options: &FormatOptions) -> String {
        let mut res = String::new();
        for (i, atv) in self.iter().enumerate() {
            if i > 0 {
                res.push('+');
            }
            res += &atv.to_rfc4514_string_with(options);
        }

        res
    }
}

impl DistinguishedName {
    /// Serialize into the RFC 4514 string format with default options.
    pub fn to_rfc4514_string(&self) -> String {
        self.to_rfc4514_string_with(&FormatOptions::default())
    }

    /// Serialize into the RFC 4514 string format.
    ///
    /// The string lists the RDNs starting with the last element of the
    /// sequence. The empty DN is the empty string.
    pub fn to_rfc4514_string_with(&self, options: &FormatOptions) -> String {
        let mut res = String::new();
        for (i, rdn) in self.iter().rev().enumerate() {
            if i > 0 {
                res.push(',');
            }
            res += &rdn.to_rfc4514_string_with(options);
        }

        res
    }
}

impl AttributeTypeAndValue {
    /// The attribute name and the raw value, without escaping.
    pub fn to_plain_string(&self) -> String {
        format!("{}={}", self.attribute().rfc4514_name(), self.value())
    }
}

impl RelativeDistinguishedName {
    /// The attributes without escaping, separated by `+`.
    pub fn to_plain_string(&self) -> String {
        let atvs: Vec<_> = self.iter().map(|x| x.to_plain_string()).collect();
        atvs.join("+")
    }
}

impl DistinguishedName {
    /// A quick unescaped view for logs and debugging.
    ///
    /// Unlike the RFC 4514 form the RDNs are listed in stored order and
    /// values are not escaped, so the result may not parse back.
    pub fn to_plain_string(&self) -> String {
        let rdns: Vec<_> = self.iter().map(|x| x.to_plain_string()).collect();
        rdns.join(",")
    }
}

impl fmt::Display for AttributeTypeAndValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc4514_string())
    }
}

impl fmt::Display for RelativeDistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc4514_string())
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc4514_string())
    }
}

/// Parse from the RFC 4514 string format.
///
/// String values are given the encoding their attribute type requires, or
/// PrintableString when the type allows it and the value fits, UTF8String
/// otherwise. Values written as `#hex` keep the encoding of the embedded
/// DER string.
impl FromStr for DistinguishedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // This format is fairly straightforward and so the parser is
        // implemented manually.
        let mut parser = Parser::default();
        let chars = s.chars().map(ParseItem::from).chain([ParseItem::Eof]);
        for c in chars {
            parser.feed(c)?;
        }

        // The string format lists RDNs in the inverse order
        let mut rdns = parser.rdns;
        rdns.reverse();
        let dn = Self::new(rdns);
        dn.validate()?;

        Ok(dn)
    }
}

#[derive(Clone, Copy)]
enum ParseItem {
    Char(char),
    Eof,
}

impl ParseItem {
    fn unexpected(self) -> Error {
        match self {
            Self::Char(c) => Error::UnexpectedCharacter(c),
            Self::Eof => Error::UnexpectedEof,
        }
    }
}

impl From<char> for ParseItem {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

#[derive(Clone, Copy, Default)]
enum Escape {
    #[default]
    None,
    Some,
    Hex(u8),
}

// Bytes of a value being parsed. Unescaped whitespace at either end is
// dropped, escaped bytes are always kept.
#[derive(Default)]
struct ValueBuffer {
    bytes: Vec<u8>,
    keep: usize,
}

impl ValueBuffer {
    fn push(&mut self, c: char) {
        if self.bytes.is_empty() && c.is_ascii_whitespace() {
            return;
        }
        let mut buf = [0; 4];
        self.bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn push_escaped(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.keep = self.bytes.len();
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn take(&mut self) -> Vec<u8> {
        while self.bytes.len() > self.keep
            && self.bytes.last().is_some_and(u8::is_ascii_whitespace)
        {
            self.bytes.pop();
        }
        self.keep = 0;

        mem::take(&mut self.bytes)
    }
}

#[derive(Default)]
struct Parser {
    rdns: Vec<RelativeDistinguishedName>,
    atvs: Vec<AttributeTypeAndValue>,
    name: String,
    ty: Option<Attribute>,
    value: ValueBuffer,
    value_is_hex: bool,
    escape: Escape,
}

impl Parser {
    fn feed(&mut self, c: ParseItem) -> Result<()> {
        match self.escape {
            Escape::None => {}
            Escape::Some => {
                // Cannot end a DN with a backslash
                let ParseItem::Char(c) = c else {
                    return Err(Error::UnexpectedEof);
                };
                match c.to_digit(16) {
                    Some(high) => self.escape = Escape::Hex(high as u8),
                    None => {
                        self.escape = Escape::None;
                        let mut buf = [0; 4];
                        self.value.push_escaped(c.encode_utf8(&mut buf).as_bytes());
                    }
                }
                return Ok(());
            }
            Escape::Hex(high) => {
                let low = match c {
                    ParseItem::Char(c) => c.to_digit(16).ok_or(Error::UnexpectedCharacter(c))?,
                    ParseItem::Eof => return Err(Error::UnexpectedEof),
                };
                self.escape = Escape::None;
                self.value.push_escaped(&[high << 4 | low as u8]);
                return Ok(());
            }
        }

        match c {
            ParseItem::Eof => {
                let is_blank = self.ty.is_none() && self.name.trim().is_empty();
                if is_blank && self.atvs.is_empty() && self.rdns.is_empty() {
                    // The empty DN
                    return Ok(());
                }
                self.end_attribute(c)?;
                self.end_rdn();
            }
            // A DN is a list of RDNs separated by commas
            ParseItem::Char(',') => {
                self.end_attribute(c)?;
                self.end_rdn();
            }
            // A multi-valued RDN is a list of attributes separated by plus
            // signs
            ParseItem::Char('+') => self.end_attribute(c)?,
            // An attribute is a type and a value separated by an equals sign
            ParseItem::Char('=') if self.ty.is_none() => {
                let name = self.name.trim();
                if name.is_empty() {
                    return Err(Error::UnexpectedCharacter('='));
                }
                self.ty = Some(parse_attribute_name(name)?);
                self.name.clear();
            }
            // A backslash starts an escape sequence
            ParseItem::Char('\\') => {
                if self.ty.is_none() {
                    return Err(Error::UnexpectedCharacter('\\'));
                }
                self.escape = Escape::Some;
            }
            // An octothorpe at the beginning of a value means that the
            // value is a hex encoded DER string
            ParseItem::Char('#') if self.ty.is_some() && self.value.is_empty() => {
                if self.value_is_hex {
                    return Err(Error::UnexpectedCharacter('#'));
                }
                self.value_is_hex = true;
            }
            // Every other character is a literal
            ParseItem::Char(c) => match self.ty {
                Some(_) => self.value.push(c),
                None => self.name.push(c),
            },
        }

        Ok(())
    }

    fn end_attribute(&mut self, c: ParseItem) -> Result<()> {
        // Ending an attribute requires a parsed type
        let Some(attribute) = self.ty.take() else {
            return Err(c.unexpected());
        };

        let bytes = self.value.take();
        let value = if mem::take(&mut self.value_is_hex) {
            let der = hex::decode(String::from_utf8(bytes)?)?;
            codec::decode_string(&der)?
        } else {
            let value = String::from_utf8(bytes)?;
            AttributeValue::new(encoding_for(&attribute, &value), value)
        };
        self.atvs.push(AttributeTypeAndValue::new(attribute, value));

        Ok(())
    }

    fn end_rdn(&mut self) {
        let atvs = mem::take(&mut self.atvs);
        self.rdns.push(RelativeDistinguishedName::new(atvs));
    }
}

/// Parse an attribute type: a short name or a dotted-decimal OID.
fn parse_attribute_name(s: &str) -> Result<Attribute> {
    let lowercase_s = s.to_lowercase();
    let name = lowercase_s.strip_prefix("oid.").unwrap_or(&lowercase_s);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Attribute::generic(name).map(|x| Attribute::from_oid(x.oid()));
    }

    let ty = match name {
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.2
        "c" | "countryname" => AttributeType::CountryName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.19
        "o" | "organizationname" => AttributeType::OrganizationName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.20
        "ou" | "organizationalunitname" => AttributeType::OrganizationalUnit,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.8
        "dnqualifier" => AttributeType::DnQualifier,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.33
        "st" | "stateorprovincename" => AttributeType::StateOrProvinceName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.3
        "cn" | "commonname" => AttributeType::CommonName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.31
        "serialnumber" => AttributeType::SerialNumber,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.16
        "l" | "localityname" => AttributeType::LocalityName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.38
        "title" => AttributeType::Title,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.32
        "sn" | "surname" => AttributeType::Surname,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.12
        "givenname" | "gn" => AttributeType::GivenName,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.14
        "initials" => AttributeType::Initials,
        // https://oidref.com/2.5.4.65
        "pseudonym" => AttributeType::Pseudonym,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.11
        "generationqualifier" => AttributeType::GenerationQualifier,
        // https://oidref.com/1.2.840.113549.1.9.1
        "email" | "emailaddress" => AttributeType::ElectronicMailAddress,
        // https://datatracker.ietf.org/doc/html/rfc4519#section-2.4
        "dc" | "domaincomponent" => AttributeType::DomainComponent,
        _ => return Err(Error::InvalidType(s.to_owned())),
    };

    Ok(Attribute::Known(ty))
}

/// Pick the string encoding for a value given in string form.
fn encoding_for(attribute: &Attribute, value: &str) -> Encoding {
    match attribute.resolve().map(AttributeType::allowed_encodings) {
        Some(AllowedEncodings::Ia5) => Encoding::Ia5String,
        Some(AllowedEncodings::Printable) => Encoding::PrintableString,
        _ if value.bytes().all(|b| codec::is_printable(b, false)) => Encoding::PrintableString,
        _ => Encoding::Utf8String,
    }
}
