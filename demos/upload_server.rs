//! Upload server demo
//!
//! Exposes two mutations over multipart requests:
//! - `singleUpload(file: Upload!)` returns `{ id }` with the file name
//! - `multipleUpload(files: [Upload!]!)` returns `{ id }` with the file
//!   names joined by a space
//!
//! Try it with:
//!
//! ```text
//! curl http://127.0.0.1:3000/graphql \
//!   -F operations='{"query":"mutation($file: Upload!) { singleUpload(file: $file) { id } }","variables":{"file":null}}' \
//!   -F map='{"0":["variables.file"]}' \
//!   -F 0=@a.txt
//! ```

use anyhow::Result;
use graphql_upload::prelude::*;
use tracing_subscriber::EnvFilter;

/// Reads every uploaded file and reports name and size
struct FileInfo;

#[async_trait]
impl Resolver for FileInfo {
    async fn resolve(&self, args: &ResolverArgs, _ctx: &ResolverContext<'_>) -> Result<Value> {
        let file = args.upload("file")?;
        let content = file.bytes().await?;
        Ok(json!({
            "name": file.file_name(),
            "contentType": file.content_type(),
            "size": content.len(),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = match std::env::var("GRAPHQL_UPLOAD_CONFIG") {
        Ok(path) => HandlerOptions::from_yaml_file(path)?,
        Err(_) => HandlerOptions::new()
            .with_multipart_enabled(true)
            .with_batching_enabled(true),
    };

    println!("\n🌐 Server running on http://127.0.0.1:3000{}", options.path);
    println!("\n  Mutations:");
    println!("    singleUpload(file: Upload!): File");
    println!("    multipleUpload(files: [Upload!]!): File");
    println!("    fileInfo(file: Upload!): FileInfo");

    GraphQLServerBuilder::new()
        .with_options(options)
        .register_fn("Mutation", "singleUpload", |args, _ctx| {
            Ok(json!({ "id": args.upload("file")?.file_name() }))
        })
        .register_fn("Mutation", "multipleUpload", |args, _ctx| {
            let names: Vec<&str> = args
                .uploads("files")?
                .iter()
                .map(|file| file.file_name())
                .collect();
            Ok(json!({ "id": names.join(" ") }))
        })
        .register_resolver("Mutation", "fileInfo", FileInfo)
        .serve("127.0.0.1:3000")
        .await
}
