//! Remote query adapter for the hosted backend
//!
//! [`supabase::SupabaseBackend`] implements the checklist and document
//! backend seams over the hosted service's REST surface: PostgREST for
//! table reads and writes, the storage object API for file upload,
//! deletion, and signed URLs.

pub mod error;
pub mod supabase;

pub use error::{RemoteError, RemoteResult};
pub use supabase::SupabaseBackend;
