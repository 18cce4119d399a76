pub mod error;
pub mod request;
pub mod resolver;
pub mod response;
pub mod upload;
pub mod value;

pub use error::{DecodeError, GraphQLError, HandlerError, RequestError};
pub use request::{GraphQLBatch, OperationRequest};
pub use resolver::{FnResolver, Resolver, ResolverArgs, ResolverContext, ResolverRegistry};
pub use response::{BatchResponse, GraphQLResponse, ResponseError};
pub use upload::{FileContent, FileUpload, UploadStore};
pub use value::InputValue;
