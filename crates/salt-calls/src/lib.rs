//! Typed call descriptors for the Salt API.
//!
//! A [`LocalCall<R>`] names a remote function, optionally a target, and its
//! keyword arguments; `R` is the type its return decodes into. Building a call
//! never touches the network. An [`Executor`] carries it to the API and the
//! call decodes what comes back.
//!
//! ```
//! use salt_calls::modules::test;
//!
//! let call = test::echo("hello");
//! assert_eq!(call.function(), "test.echo");
//! ```

pub mod arguments;
pub mod call;
pub mod error;
pub mod executor;
pub mod hash;
pub mod modules;
pub mod request;
pub mod response;
pub mod target;

pub use arguments::{Arguments, ArgumentsBuilder};
pub use call::LocalCall;
pub use error::{CallError, SaltError};
pub use executor::Executor;
pub use hash::HashType;
pub use request::{CallRequest, ClientKind};
pub use response::ReturnEnvelope;
pub use target::{Target, TargetType};
