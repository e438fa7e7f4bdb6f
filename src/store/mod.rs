//! Score persistence backed by Supabase

pub mod scores;
pub mod supabase;

pub use scores::{ScoreRecord, ScoreStore, ScoreWriter};
pub use supabase::{StoreError, SupabaseClient};
