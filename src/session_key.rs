use std::{fmt, ops::Deref};

use crate::{BufferSet, Error, Oid, oid};

/// The session key of an established Kerberos context.
///
/// The provider answers the session key inquiry with two buffers: the raw key
/// and the inquiry OID with the RFC 3961 encryption type appended as one more
/// arc. Some providers omit the second buffer, in which case [`etype`] is
/// `None`.
///
/// [`etype`]: SessionKey::etype
pub struct SessionKey {
    buffers: BufferSet,
    etype: Option<i32>,
}
impl SessionKey {
    pub(crate) fn from_buffer_set(buffers: BufferSet) -> Result<Self, Error> {
        if buffers.is_empty() {
            return Err(Error::EmptyBufferSet);
        }
        let etype = buffers.get(1).and_then(parse_etype);
        Ok(Self { buffers, etype })
    }

    /// The raw key, valid until this handle is dropped.
    pub fn as_slice(&self) -> &[u8] {
        self.buffers.get(0).unwrap_or(&[])
    }

    /// RFC 3961 encryption type of the key, e.g. 18 for aes256-cts-hmac-sha1-96.
    pub fn etype(&self) -> Option<i32> {
        self.etype
    }
}
impl Deref for SessionKey {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}
impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.etype {
            Some(etype) => write!(f, "session key: etype {etype}, {} bytes", self.as_slice().len()),
            None => write!(f, "session key: unknown etype, {} bytes", self.as_slice().len()),
        }
    }
}
impl fmt::Debug for SessionKey {
    // never print the key itself
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("etype", &self.etype)
            .field("length", &self.as_slice().len())
            .finish()
    }
}

fn parse_etype(attribute: &[u8]) -> Option<i32> {
    oid::trailing_arc(attribute, Oid::INQ_SSPI_SESSION_KEY.elements())
        .and_then(|arc| i32::try_from(arc).ok())
}
