//! Search endpoints
//!
//! One resource per Twingly API, reached through [`Client::blog`],
//! [`Client::forum`] and [`Client::social`].
//!
//! [`Client::blog`]: crate::Client::blog
//! [`Client::forum`]: crate::Client::forum
//! [`Client::social`]: crate::Client::social

pub mod blog;
pub mod forum;
pub mod social;

pub use blog::Blog;
pub use forum::Forum;
pub use social::Social;
