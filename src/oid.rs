use std::{ffi::c_void, fmt::Display};

use libgssapi_sys::gss_OID_desc_struct;

/// An object identifier naming a property of a security context.
///
/// Holds the BER arc encoding of the identifier (no tag or length octets),
/// which is what the providers expect in a `gss_OID_desc`. The bytes are
/// borrowed, so extension identifiers can be built at runtime; the well-known
/// ones are `'static` constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Oid<'a> {
    elements: &'a [u8],
}
impl Oid<'static> {
    /// 1.2.840.113554.1.2.2.5.5, the session key of an established Kerberos
    /// context. Same identifier the SSPI `QueryContextAttributes` session key
    /// inquiry uses, hence the name in the C headers.
    pub const INQ_SSPI_SESSION_KEY: Oid<'static> =
        Oid::from_elements(&[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x12, 0x01, 0x02, 0x02, 0x05, 0x05]);
}
impl<'a> Oid<'a> {
    pub const fn from_elements(elements: &'a [u8]) -> Self {
        Self { elements }
    }
    pub fn elements(&self) -> &'a [u8] {
        self.elements
    }
    pub(crate) fn as_desc(&self) -> gss_OID_desc_struct {
        gss_OID_desc_struct {
            length: self.elements.len() as u32,
            elements: self.elements.as_ptr() as *mut c_void,
        }
    }
}
impl Display for Oid<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut arcs = ArcIter::new(self.elements);
        match arcs.next() {
            // the first two arcs share an octet; roots 0 and 1 carry at most 39 below them
            Some(first) if first >= 80 => write!(f, "2.{}", first - 80)?,
            Some(first) => write!(f, "{}.{}", first / 40, first % 40)?,
            None => return Ok(()),
        }
        for arc in arcs {
            write!(f, ".{arc}")?;
        }
        Ok(())
    }
}

/// Decodes the single arc the provider appended after `prefix`, or `None` if
/// the bytes are not `prefix` plus exactly one base-128 arc.
pub(crate) fn trailing_arc(bytes: &[u8], prefix: &[u8]) -> Option<u32> {
    let tail = bytes.strip_prefix(prefix)?;
    if tail.is_empty() {
        return None;
    }
    let mut arcs = ArcIter::new(tail);
    let arc = arcs.next()?;
    if arcs.rest.is_empty() {
        Some(arc)
    } else {
        None
    }
}

struct ArcIter<'a> {
    rest: &'a [u8],
}
impl<'a> ArcIter<'a> {
    fn new(rest: &'a [u8]) -> Self {
        Self { rest }
    }
}
impl Iterator for ArcIter<'_> {
    type Item = u32;
    fn next(&mut self) -> Option<u32> {
        let mut arc: u32 = 0;
        loop {
            let (&byte, rest) = self.rest.split_first()?;
            self.rest = rest;
            arc = arc.checked_mul(128)? | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Some(arc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_oid_displays_dotted() {
        assert_eq!(Oid::INQ_SSPI_SESSION_KEY.to_string(), "1.2.840.113554.1.2.2.5.5");
    }

    #[test]
    fn runtime_built_oids_are_admitted() {
        let mut elements = Oid::INQ_SSPI_SESSION_KEY.elements().to_vec();
        elements.push(0x06);
        let oid = Oid::from_elements(&elements);
        assert_eq!(oid.to_string(), "1.2.840.113554.1.2.2.5.5.6");
        assert_eq!(oid.as_desc().length, elements.len() as u32);
    }

    #[test]
    fn trailing_arc_decodes_single_byte() {
        let mut bytes = Oid::INQ_SSPI_SESSION_KEY.elements().to_vec();
        bytes.push(0x12);
        assert_eq!(trailing_arc(&bytes, Oid::INQ_SSPI_SESSION_KEY.elements()), Some(18));
    }

    #[test]
    fn trailing_arc_decodes_multi_byte() {
        let mut bytes = Oid::INQ_SSPI_SESSION_KEY.elements().to_vec();
        bytes.extend_from_slice(&[0x81, 0x28]);
        assert_eq!(trailing_arc(&bytes, Oid::INQ_SSPI_SESSION_KEY.elements()), Some(168));
    }

    #[test]
    fn trailing_arc_rejects_wrong_prefix() {
        assert_eq!(trailing_arc(&[0x55, 0x12], Oid::INQ_SSPI_SESSION_KEY.elements()), None);
    }

    #[test]
    fn trailing_arc_rejects_missing_or_extra_arcs() {
        let prefix = Oid::INQ_SSPI_SESSION_KEY.elements();
        assert_eq!(trailing_arc(prefix, prefix), None);
        let mut bytes = prefix.to_vec();
        bytes.extend_from_slice(&[0x12, 0x13]);
        assert_eq!(trailing_arc(&bytes, prefix), None);
    }

    #[test]
    fn trailing_arc_rejects_truncated_encoding() {
        let mut bytes = Oid::INQ_SSPI_SESSION_KEY.elements().to_vec();
        bytes.push(0x81);
        assert_eq!(trailing_arc(&bytes, Oid::INQ_SSPI_SESSION_KEY.elements()), None);
    }
}
