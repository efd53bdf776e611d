//! HTTP clients for the external services Interio delegates to.
//!
//! - [`blockade`] - Blockade Labs Skybox generation.
//! - [`stable_diffusion`] - Stable Diffusion WebUI `txt2img`.
//! - [`llama_stack`] - LlamaStack agents, sessions, turns and RAG.
//! - [`tunnel`] - ngrok tunnel discovery for the public webhook URL.
//! - [`fetch`] - downloading finished assets.

pub mod blockade;
pub mod fetch;
pub mod llama_stack;
pub mod stable_diffusion;
pub mod tunnel;

#[cfg(test)]
pub(crate) mod test_support;
