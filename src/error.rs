use std::{fmt::Display, num::NonZero};

use libgssapi_sys::{
    _GSS_S_CONTINUE_NEEDED, _GSS_S_FAILURE, GSS_C_GSS_CODE, GSS_C_MECH_CODE, gss_buffer_desc_struct,
    gss_display_status, gss_release_buffer,
};

// RFC 2744 major status layout. Supplementary bits (like GSS_S_CONTINUE_NEEDED)
// live below the routine field and never indicate failure.
const CALLING_ERROR_MASK: u32 = 0o377 << 24;
const ROUTINE_ERROR_MASK: u32 = 0o377 << 16;

pub(crate) fn is_error(major: u32) -> bool {
    major & (CALLING_ERROR_MASK | ROUTINE_ERROR_MASK) != 0
}

pub(crate) fn continue_needed(major: u32) -> bool {
    major & _GSS_S_CONTINUE_NEEDED != 0
}

/// Turns a major/minor status pair into a [`Result`].
///
/// The mechanism-specific minor code is preferred when the provider set one,
/// since it is the finer-grained of the two.
pub(crate) fn check(major: u32, minor: u32) -> Result<(), Error> {
    if !is_error(major) {
        return Ok(());
    }
    if let Some(mech) = MechanismErrorCode::new(minor) {
        Err(Error::Mechanism(mech))
    } else if let Some(gss) = GssErrorCode::new(major) {
        Err(Error::Gss(gss))
    } else {
        // error bits imply a nonzero major, but never let this degrade to success
        Err(failure())
    }
}

const FAILURE: NonZero<u32> = match NonZero::new(_GSS_S_FAILURE) {
    Some(code) => code,
    None => panic!(),
};

/// A generic failure for the rare spots where the provider reports success
/// but hands back nothing usable.
pub(crate) fn failure() -> Error {
    Error::Gss(GssErrorCode(FAILURE))
}

#[derive(Clone, Copy, Debug)]
pub struct GssErrorCode(NonZero<u32>);
impl GssErrorCode {
    pub fn new(val: u32) -> Option<Self> {
        NonZero::new(val).map(Self)
    }
}
impl Display for GssErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_from_u32(self.0.into(), GSS_C_GSS_CODE as i32, f)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MechanismErrorCode(NonZero<u32>);
impl MechanismErrorCode {
    pub fn new(val: u32) -> Option<Self> {
        NonZero::new(val).map(Self)
    }
}
impl Display for MechanismErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_from_u32(self.0.into(), GSS_C_MECH_CODE as i32, f)
    }
}

fn write_from_u32(val: u32, status_type: i32, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut minor_status = 0;
    let mut message_context = 0;
    let mut string = gss_buffer_desc_struct {
        length: 0,
        value: std::ptr::null_mut(),
    };
    unsafe {
        gss_display_status(
            &mut minor_status,
            val,
            status_type,
            std::ptr::null_mut(),
            &mut message_context,
            &mut string,
        )
    };
    if !string.value.is_null() {
        let bytes = unsafe { std::slice::from_raw_parts(string.value as *const u8, string.length) };
        if let Ok(text) = std::str::from_utf8(bytes) {
            write!(f, "{text}")?;
        }
        let mut _s = 0;
        unsafe { gss_release_buffer(&mut _s, &mut string) };
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub enum Error {
    Gss(GssErrorCode),
    Mechanism(MechanismErrorCode),
    /// The provider answered an inquiry with an empty buffer set.
    EmptyBufferSet,
}
impl std::error::Error for Error {}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gss(gss) => gss.fmt(f),
            Self::Mechanism(mech) => mech.fmt(f),
            Self::EmptyBufferSet => write!(f, "provider returned an empty buffer set"),
        }
    }
}
impl From<GssErrorCode> for Error {
    fn from(value: GssErrorCode) -> Self {
        Self::Gss(value)
    }
}
impl From<MechanismErrorCode> for Error {
    fn from(value: MechanismErrorCode) -> Self {
        Self::Mechanism(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libgssapi_sys::GSS_S_COMPLETE;

    #[test]
    fn complete_is_not_an_error() {
        assert!(check(GSS_S_COMPLETE, 0).is_ok());
    }

    #[test]
    fn continue_needed_is_not_an_error() {
        assert!(!is_error(_GSS_S_CONTINUE_NEEDED));
        assert!(continue_needed(_GSS_S_CONTINUE_NEEDED));
        assert!(check(_GSS_S_CONTINUE_NEEDED, 0).is_ok());
    }

    #[test]
    fn calling_and_routine_errors_are_detected() {
        assert!(is_error(1 << 24));
        assert!(is_error(_GSS_S_FAILURE));
        assert!(matches!(check(_GSS_S_FAILURE, 0), Err(Error::Gss(_))));
    }

    #[test]
    fn error_bits_never_check_out_as_success() {
        for major in [1 << 24, 1 << 16, _GSS_S_FAILURE, CALLING_ERROR_MASK | ROUTINE_ERROR_MASK] {
            assert!(check(major, 0).is_err());
        }
    }

    #[test]
    fn minor_code_wins_when_present() {
        assert!(matches!(check(_GSS_S_FAILURE, 2529638919), Err(Error::Mechanism(_))));
    }

    #[test]
    fn zero_codes_are_rejected() {
        assert!(GssErrorCode::new(0).is_none());
        assert!(MechanismErrorCode::new(0).is_none());
    }
}
