//! Root crate facade for the Pastebox server and its storage core.

pub use pastebox_core::{blob, slug, BlobError, BlobReader};
pub use pastebox_server::{
    access, config, create_app, db, error, handlers, identity, models, paste_ops,
    resolve_bind_address, serve_router, AppError, AppState, BlobStore, Config, Database,
    Identity, DEFAULT_PORT,
};
