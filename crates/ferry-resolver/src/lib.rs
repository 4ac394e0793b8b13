//! Turns mapping records into HTTP responses.
//!
//! URL mappings are fetched through an [`Upstream`] and streamed back with a
//! rewritten header set; text mappings are served from the record itself.
//! The gist and QR code proxies share the same [`Upstream`].

pub mod config;
pub mod error;
pub mod gist;
pub mod headers;
pub mod qrcode;
pub mod resolver;
pub mod upstream;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use gist::GistProxy;
pub use qrcode::QrCodeGenerator;
pub use resolver::{ContentResolver, Resolver};
pub use upstream::{HttpUpstream, Upstream, UpstreamResponse};
