// Interface adapters: wire protocol, HTTP page and socket handling.

pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
