use std::{ffi::c_void, fmt::Display, ptr::NonNull};

use libgssapi_sys::{
    GSS_C_NT_HOSTBASED_SERVICE, GSS_C_NT_USER_NAME, gss_OID, gss_buffer_desc_struct, gss_display_name,
    gss_import_name, gss_name_struct, gss_name_t, gss_release_buffer, gss_release_name,
};

use crate::{Error, error};

/// How a principal string should be interpreted on import.
#[derive(Clone, Copy, Debug)]
pub enum NameKind {
    /// A user principal like `alice@EXAMPLE.COM`.
    User,
    /// A service of the form `service@hostname`.
    HostBasedService,
}
impl NameKind {
    fn to_oid(self) -> gss_OID {
        match self {
            Self::User => unsafe { GSS_C_NT_USER_NAME },
            Self::HostBasedService => unsafe { GSS_C_NT_HOSTBASED_SERVICE },
        }
    }
}

/// A provider-internal principal name.
pub struct NameHandle {
    name: NonNull<gss_name_struct>,
}
unsafe impl Send for NameHandle {}
unsafe impl Sync for NameHandle {}
impl NameHandle {
    pub fn import(principal: &str, kind: NameKind) -> Result<Self, Error> {
        let mut minor = 0;
        let mut buffer = gss_buffer_desc_struct {
            length: principal.len(),
            value: principal.as_ptr() as *mut c_void,
        };
        let mut name = std::ptr::null_mut::<gss_name_struct>();
        let major = unsafe { gss_import_name(&mut minor, &mut buffer, kind.to_oid(), &mut name) };
        error::check(major, minor)?;
        let name = NonNull::new(name).ok_or_else(error::failure)?;
        Ok(NameHandle { name })
    }

    pub(crate) fn from_raw(name: gss_name_t) -> Option<Self> {
        NonNull::new(name).map(|name| NameHandle { name })
    }
    pub(crate) fn as_ptr(&self) -> gss_name_t {
        self.name.as_ptr()
    }

    /// Printable form of the name, as the provider renders it.
    pub fn display_string(&self) -> Result<String, Error> {
        let mut minor = 0;
        let mut buffer = gss_buffer_desc_struct {
            length: 0,
            value: std::ptr::null_mut(),
        };
        let major = unsafe {
            gss_display_name(
                &mut minor,
                self.name.as_ptr(),
                &mut buffer,
                std::ptr::null_mut(),
            )
        };
        error::check(major, minor)?;
        let text = if buffer.value.is_null() {
            String::new()
        } else {
            let bytes = unsafe { std::slice::from_raw_parts(buffer.value as *const u8, buffer.length) };
            let text = String::from_utf8_lossy(bytes).into_owned();
            let mut _s = 0;
            unsafe { gss_release_buffer(&mut _s, &mut buffer) };
            text
        };
        Ok(text)
    }
}
impl Drop for NameHandle {
    fn drop(&mut self) {
        let mut _s = 0;
        unsafe { gss_release_name(&mut _s, &mut NonNull::as_ptr(self.name)) };
    }
}
impl Display for NameHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.display_string() {
            Ok(text) => write!(f, "{text}"),
            Err(_) => Ok(()),
        }
    }
}
