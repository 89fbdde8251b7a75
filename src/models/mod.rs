//! Data models for the church site.
//!
//! Content is stored as loosely-shaped JSON records; the types here pin down the parts the
//! storage layer relies on (keys, locales, record ids, admin settings).

mod content;
mod record;
mod requests;
mod settings;

pub use content::*;
pub use record::*;
pub use requests::*;
pub use settings::*;
