use std::{
    ptr::NonNull,
    time::{Duration, Instant},
};

use libgssapi_sys::{
    _GSS_C_INDEFINITE, GSS_C_ACCEPT, GSS_C_BOTH, GSS_C_INITIATE, gss_OID_set_desc, gss_acquire_cred,
    gss_cred_id_struct, gss_cred_id_t, gss_release_cred,
};

use crate::{
    Error, error, gss_mech_krb5,
    name::{NameHandle, NameKind},
};

/// Which direction a credentials handle may be used in.
#[derive(Clone, Copy, Debug)]
pub enum CredentialsUsage {
    /// Accepting contexts only, like a service with a keytab.
    Inbound,
    /// Initiating contexts only, like a user with a ticket cache.
    Outbound,
    Both,
}
impl CredentialsUsage {
    fn to_c(self) -> i32 {
        match self {
            Self::Inbound => GSS_C_ACCEPT as i32,
            Self::Outbound => GSS_C_INITIATE as i32,
            Self::Both => GSS_C_BOTH as i32,
        }
    }
}

/// A Kerberos credentials handle from the default credential store.
pub struct Credentials {
    handle: NonNull<gss_cred_id_struct>,
    valid_until: Instant,
}
// Valid, because Credentials does not expose any mutability and is the sole owner of the underlying memory
unsafe impl Send for Credentials {}
unsafe impl Sync for Credentials {}
impl Credentials {
    /// Acquires credentials for `principal`, or for the default principal of
    /// the process when `None`.
    pub fn acquire(
        usage: CredentialsUsage,
        principal: Option<&str>,
        time_required: Option<Duration>,
    ) -> Result<Self, Error> {
        let name = principal
            .map(|p| NameHandle::import(p, NameKind::User))
            .transpose()?;
        let mut minor = 0;
        let mut validity = 0;
        let mut handle = std::ptr::null_mut();
        let mut mech_set = gss_OID_set_desc {
            count: 1,
            elements: unsafe { gss_mech_krb5 },
        };
        let major = unsafe {
            gss_acquire_cred(
                &mut minor,
                name.as_ref().map(NameHandle::as_ptr).unwrap_or(std::ptr::null_mut()),
                time_required
                    .map(|d| d.as_secs().try_into().unwrap_or(u32::MAX))
                    .unwrap_or(_GSS_C_INDEFINITE),
                &mut mech_set,
                usage.to_c(),
                &mut handle,
                std::ptr::null_mut(),
                &mut validity,
            )
        };
        error::check(major, minor)?;
        let handle = NonNull::new(handle).ok_or_else(error::failure)?;
        Ok(Self {
            handle,
            valid_until: Instant::now() + Duration::from_secs(validity.into()),
        })
    }

    pub fn inbound(principal: Option<&str>, time_required: Option<Duration>) -> Result<Self, Error> {
        Self::acquire(CredentialsUsage::Inbound, principal, time_required)
    }
    pub fn outbound(principal: Option<&str>, time_required: Option<Duration>) -> Result<Self, Error> {
        Self::acquire(CredentialsUsage::Outbound, principal, time_required)
    }

    pub fn valid_until(&self) -> Instant {
        self.valid_until
    }
    pub(crate) fn as_ptr(&self) -> gss_cred_id_t {
        self.handle.as_ptr()
    }
}
impl Drop for Credentials {
    fn drop(&mut self) {
        let mut _s = 0;
        unsafe {
            gss_release_cred(&mut _s, &mut NonNull::as_ptr(self.handle));
        }
    }
}
