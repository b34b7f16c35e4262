use std::time::Duration;

use libgssapi_sys::_GSS_C_INDEFINITE;

use crate::{
    Error,
    client::{StepOut, step},
    context::CtxFlags,
    cred::Credentials,
    name::{NameHandle, NameKind},
};

pub struct ClientBuilder {
    cred: Credentials,
    target: NameHandle,
    requested_flags: CtxFlags,
    requested_duration: Option<Duration>,
}
impl ClientBuilder {
    /// Targets a host-based service principal of the form `service@hostname`.
    pub fn new(cred: Credentials, service_principal: &str) -> Result<Self, Error> {
        let target = NameHandle::import(service_principal, NameKind::HostBasedService)?;
        Ok(Self {
            cred,
            target,
            requested_flags: CtxFlags::empty(),
            requested_duration: None,
        })
    }
    /// Targets an arbitrary imported name instead.
    pub fn new_for_name(cred: Credentials, target: NameHandle) -> Self {
        Self {
            cred,
            target,
            requested_flags: CtxFlags::empty(),
            requested_duration: None,
        }
    }

    pub fn request_mutual_auth(mut self) -> Self {
        self.requested_flags |= CtxFlags::MUTUAL_AUTH;
        self
    }
    pub fn request_duration(self, duration: Duration) -> Self {
        Self {
            requested_duration: Some(duration),
            ..self
        }
    }

    /// Produces the first token of the exchange.
    pub fn initialize(self) -> Result<StepOut, Error> {
        let lifetime = self
            .requested_duration
            .map(|d| d.as_secs().try_into().unwrap_or(u32::MAX))
            .unwrap_or(_GSS_C_INDEFINITE);
        step(None, self.cred, self.target, None, self.requested_flags, lifetime)
    }
}
