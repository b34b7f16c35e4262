//! Safe wrappers for the GSS-API buffer set extensions.
//!
//! The GGF extensions let a caller ask an established security context for
//! provider attributes by OID (`gss_inquire_sec_context_by_oid`); the answer
//! is a buffer set the caller has to release as a whole
//! (`gss_release_buffer_set`). The best known attribute is the Kerberos
//! session key, which SSPI exposes the same way.
//!
//! [`BufferSet`] owns a provider-allocated set and releases it on drop, so a
//! set can neither leak nor be used after release. [`SessionKey`] is the typed
//! view of the session key inquiry. Enough establishment plumbing is included
//! ([`cred`], [`client`], [`server`]) to get from nothing to an established
//! context; all negotiation and cryptography stays inside the system GSS
//! library.
//!
//! ```no_run
//! use gss_inquire::{client::{ClientBuilder, StepOut}, Credentials};
//!
//! # fn main() -> Result<(), gss_inquire::Error> {
//! let cred = Credentials::outbound(None, None)?;
//! let mut stepped = ClientBuilder::new(cred, "host@server.example.com")?.initialize()?;
//! let established = loop {
//!     match stepped {
//!         StepOut::Established(ctx) => break ctx,
//!         StepOut::Pending(pending) => {
//!             let answer = todo!("send pending.next_token() to the acceptor");
//!             stepped = pending.step(answer)?;
//!         }
//!     }
//! };
//! let key = established.session_key()?;
//! println!("{key}");
//! # Ok(())
//! # }
//! ```

// Exported by libgssapi_krb5.so (declared in gssapi/gssapi_krb5.h), which
// libgssapi-sys links but does not bind.
extern "C" {
    pub(crate) static gss_mech_krb5: libgssapi_sys::gss_OID;
}

mod buffer;
mod buffer_set;
pub use buffer_set::BufferSet;
pub mod client;
mod context;
pub use context::CtxFlags;
pub mod cred;
pub use cred::{Credentials, CredentialsUsage};
mod error;
pub use error::Error;
mod name;
pub use name::{NameHandle, NameKind};
mod oid;
pub use oid::Oid;
pub mod server;
mod session_key;
pub use session_key::SessionKey;
