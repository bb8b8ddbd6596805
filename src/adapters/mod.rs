// Adapters layer: concrete implementations of the domain ports (remote REST store, mail API, in-memory fixture store).

pub mod memory;
pub mod postgrest;
pub mod resend;

pub use memory::InMemoryDirectory;
pub use postgrest::PostgrestClient;
pub use resend::ResendMailer;
