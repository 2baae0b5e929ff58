//! Response envelope decoding
//!
//! The API wraps every payload in a `data` envelope. Paginated listings put
//! their items and continuation cursor inside it:
//!
//! ```text
//! { "data": { "items": [ ... ], "next_cursor": "..." } }
//! { "data": { ... } }
//! ```
//!
//! Envelope keys are matched case-insensitively and without regard to
//! `snake_case`/`camelCase`, so `next_cursor`, `nextCursor` and `NextCursor`
//! all resolve to the same field. A `null` root or missing `data` decodes to
//! an empty result rather than an error.

mod decoders;
mod types;

pub use decoders::EnvelopeDecoder;
pub use types::Page;
