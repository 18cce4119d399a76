//! Multipart GraphQL requests
//!
//! Implements the GraphQL multipart request convention: a body with an
//! `operations` part, a `map` part, and one part per uploaded file.
//!
//! ```text
//! --boundary
//! Content-Disposition: form-data; name="operations"
//!
//! {"query":"mutation($file: Upload!) { singleUpload(file: $file) { id } }","variables":{"file":null}}
//! --boundary
//! Content-Disposition: form-data; name="map"
//!
//! {"0":["variables.file"]}
//! --boundary
//! Content-Disposition: form-data; name="0"; filename="a.txt"
//! Content-Type: text/plain
//!
//! alpha
//! --boundary--
//! ```

pub mod decoder;
pub mod path;
pub mod reader;

pub use decoder::{UploadMap, decode_multipart, parse_map};
pub use path::{PathSegment, VariablePath};
pub use reader::{MultipartParts, parse_boundary, read_multipart};
