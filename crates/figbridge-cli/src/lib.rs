//! figbridge command line support: the collector's CLI host, the OS URL
//! opener, and the in-process bridge session.

pub mod collect;
pub mod opener;
pub mod session;

pub use collect::CliHost;
pub use session::{run_session, Hop, Route, SessionReport};
