//! Asynchronous shader source loading.
//!
//! Both sources are requested at once. The completion callback fires exactly once,
//! when both have loaded; a failed request is logged and blocks completion for good.

use std::future::Future;

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use crate::abs::ShaderStage;
use crate::host::Host;

/// Progress of a single source request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceState {
    #[default]
    Pending,
    Loaded(String),
    Failed,
}

/// The vertex and fragment source of one program, each loaded independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: SourceState,
    pub fragment: SourceState,
}

impl ShaderSources {
    /// Records the terminal result of the request for `stage`.
    ///
    /// Only pending slots move. A failed or loaded slot never changes again.
    pub fn complete(&mut self, stage: ShaderStage, result: Result<String, String>) {
        let slot = match stage {
            ShaderStage::Vertex => &mut self.vertex,
            ShaderStage::Fragment => &mut self.fragment,
        };
        if *slot != SourceState::Pending {
            return;
        }
        *slot = match result {
            Ok(text) => SourceState::Loaded(text),
            Err(_) => SourceState::Failed,
        };
    }

    pub fn is_loaded(&self) -> bool {
        matches!(
            (&self.vertex, &self.fragment),
            (SourceState::Loaded(_), SourceState::Loaded(_))
        )
    }

    pub fn has_failed(&self) -> bool {
        self.vertex == SourceState::Failed || self.fragment == SourceState::Failed
    }

    /// Moves both texts out once both have loaded, leaving the slots pending.
    pub fn take(&mut self) -> Option<(String, String)> {
        if !self.is_loaded() {
            return None;
        }
        match (
            std::mem::take(&mut self.vertex),
            std::mem::take(&mut self.fragment),
        ) {
            (SourceState::Loaded(vertex), SourceState::Loaded(fragment)) => {
                Some((vertex, fragment))
            }
            _ => None,
        }
    }
}

/// Awaits both requests concurrently and returns `(vertex, fragment)` if both loaded.
///
/// Requests are not cancelled when their sibling fails, so every failure gets logged.
pub async fn load_shader_sources<V, F>(
    vertex_url: &str,
    fragment_url: &str,
    vertex: V,
    fragment: F,
) -> Option<(String, String)>
where
    V: Future<Output = Result<String, String>>,
    F: Future<Output = Result<String, String>>,
{
    type Tagged<'a> = LocalBoxFuture<'a, (ShaderStage, Result<String, String>)>;

    let mut pending: FuturesUnordered<Tagged<'_>> = FuturesUnordered::new();
    pending.push(vertex.map(|result| (ShaderStage::Vertex, result)).boxed_local());
    pending.push(fragment.map(|result| (ShaderStage::Fragment, result)).boxed_local());

    let mut sources = ShaderSources::default();
    let mut loaded = None;

    while let Some((stage, result)) = pending.next().await {
        let url = match stage {
            ShaderStage::Vertex => vertex_url,
            ShaderStage::Fragment => fragment_url,
        };
        match &result {
            Ok(text) => log::debug!("Loaded {} ({} bytes)", url, text.len()),
            Err(e) => log::error!("unable to GET {}: {}", url, e),
        }
        sources.complete(stage, result);

        if loaded.is_none() {
            loaded = sources.take();
        }
    }

    if sources.has_failed() {
        log::warn!(
            "Sources {} / {} incomplete, no program will be built",
            vertex_url,
            fragment_url
        );
    }
    loaded
}

/// Starts loading both sources on the host's event loop and calls `on_loaded` with
/// `(vertex, fragment)` once both have arrived.
pub fn fetch_shader_sources<H, C>(host: &H, vertex_url: &str, fragment_url: &str, on_loaded: C)
where
    H: Host + ?Sized,
    C: FnOnce(String, String) + 'static,
{
    let vertex = host.fetch_text(vertex_url);
    let fragment = host.fetch_text(fragment_url);
    let vertex_url = vertex_url.to_owned();
    let fragment_url = fragment_url.to_owned();

    host.spawn_local(
        async move {
            if let Some((vertex, fragment)) =
                load_shader_sources(&vertex_url, &fragment_url, vertex, fragment).await
            {
                on_loaded(vertex, fragment);
            }
        }
        .boxed_local(),
    );
}
