pub mod builder;
pub mod gallery_view;
pub mod server_state;
pub mod session;

pub use builder::ServerStateBuilder;
pub use server_state::ServerState;
