//! The LLM gateway: one deadline-bounded provider call per request,
//! normalized into an [`LlmResponse`].
//!
//! Timeouts and provider failures come back as error-tagged responses. Only
//! misuse (vision call on a text-only provider, non-UTF-8 image path) and
//! unreadable image files are returned as `Err`. Image calls consult and
//! fill the shared [`ResultCache`] when one is attached.

use super::cache::ResultCache;
use super::extract::extract_json;
use super::pool::{PoolError, WorkerPool};
use super::provider::{Completion, ImageInput, LlmProvider, ProviderError, ProviderFactory};
use super::response::{estimate_tokens, ErrorKind, LlmResponse};
use crate::config::Config;
use crate::error::{ConfigError, GatewayError, GatewayResult};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Options for a text prompt.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Run the JSON extractor over the answer
    pub wants_json: bool,
    /// Per-call deadline; `None` or zero uses the gateway default
    pub deadline: Option<Duration>,
}

impl AskOptions {
    /// Options asking for a JSON answer.
    pub fn json() -> Self {
        Self {
            wants_json: true,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Options for an image prompt.
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// MIME type sent alongside the image bytes
    pub mime: String,
    /// Run the JSON extractor over the answer
    pub wants_json: bool,
    /// Read from and write to the result cache
    pub use_cache: bool,
    /// Per-call deadline; `None` or zero uses the gateway default
    pub deadline: Option<Duration>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            mime: "image/jpeg".to_string(),
            wants_json: false,
            use_cache: true,
            deadline: None,
        }
    }
}

impl ImageOptions {
    /// Options asking for a JSON answer.
    pub fn json() -> Self {
        Self {
            wants_json: true,
            ..Self::default()
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Deadline-bounded front door to one LLM provider.
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    pool: WorkerPool,
    cache: Option<Arc<ResultCache>>,
    default_deadline: Duration,
}

impl LlmGateway {
    /// Build a gateway around an existing provider.
    pub fn new(provider: Box<dyn LlmProvider>, pool: WorkerPool, default_deadline: Duration) -> Self {
        Self {
            provider: Arc::from(provider),
            pool,
            cache: None,
            default_deadline,
        }
    }

    /// Build the configured provider and wrap it.
    ///
    /// Fails when the provider needs credentials that are not set.
    pub fn from_config(
        config: &Config,
        pool: WorkerPool,
        cache: Option<Arc<ResultCache>>,
    ) -> Result<Self, ConfigError> {
        let provider = ProviderFactory::create(&config.llm)?;
        let mut gateway = Self::new(provider, pool, config.llm_timeout());
        gateway.cache = cache;
        Ok(gateway)
    }

    /// Attach a result cache for image calls.
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache>> {
        self.cache.as_ref()
    }

    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    /// Send a text prompt.
    ///
    /// Never fails: timeouts and provider errors are reported through
    /// [`LlmResponse::error`]. The token count is the provider's usage figure
    /// when reported, otherwise a length-based estimate.
    pub async fn ask(&self, prompt: &str, options: AskOptions) -> LlmResponse {
        let deadline = self.resolve_deadline(options.deadline);
        let provider = self.provider.clone();
        let owned_prompt = prompt.to_string();

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            ?deadline,
            "Dispatching text prompt"
        );
        let outcome = self
            .dispatch("ask", deadline, async move {
                provider.complete_text(&owned_prompt).await
            })
            .await;

        match outcome {
            Ok(Ok(completion)) => {
                let tokens = completion
                    .total_tokens
                    .unwrap_or_else(|| estimate_tokens(prompt, &completion.text));
                finish(completion.text, tokens, options.wants_json)
            }
            Ok(Err(kind)) => LlmResponse::failed(kind),
            // Every provider must complete text; a refusal is just a failed call here.
            Err(e) => LlmResponse::failed(ErrorKind::ProviderFailure {
                message: e.to_string(),
                status_code: None,
            }),
        }
    }

    /// Send a prompt together with the image at `image_path`.
    ///
    /// With `use_cache`, the cache is first trimmed to capacity and then
    /// looked up by the exact path string; a hit is returned without calling
    /// the provider. Paths that are not valid UTF-8 are rejected, since they
    /// cannot serve as exact cache keys. The image is read and encoded on the
    /// caller's task before the deadline starts. Successful answers are
    /// cached; failures are not. The token count is always the length-based
    /// estimate.
    pub async fn ask_with_image(
        &self,
        prompt: &str,
        image_path: impl AsRef<Path>,
        options: ImageOptions,
    ) -> GatewayResult<LlmResponse> {
        let image_path = image_path.as_ref();
        let key = image_path
            .to_str()
            .ok_or_else(|| GatewayError::InvalidPath(image_path.to_path_buf()))?
            .to_string();
        let cache = self.cache.as_ref().filter(|_| options.use_cache);

        if let Some(cache) = cache {
            cache.evict_overflow().await;
            if let Some(hit) = cache.get(&key).await {
                debug!(image = %key, "Image result cache hit");
                return Ok(hit);
            }
        }

        if !self.provider.supports_vision() {
            return Err(GatewayError::Unsupported {
                provider: self.provider.name().to_string(),
                operation: "ask_with_image",
            });
        }

        let bytes = std::fs::read(image_path).map_err(|source| GatewayError::ImageRead {
            path: image_path.to_path_buf(),
            source,
        })?;
        let image = ImageInput::from_bytes(&bytes, &options.mime);

        let deadline = self.resolve_deadline(options.deadline);
        let provider = self.provider.clone();
        let owned_prompt = prompt.to_string();

        debug!(
            provider = self.provider.name(),
            image = %key,
            bytes = bytes.len(),
            ?deadline,
            "Dispatching image prompt"
        );
        let outcome = self
            .dispatch("ask_with_image", deadline, async move {
                provider.complete_vision(&owned_prompt, &image).await
            })
            .await?;

        let completion = match outcome {
            Ok(completion) => completion,
            Err(kind) => return Ok(LlmResponse::failed(kind)),
        };

        let tokens = estimate_tokens(prompt, &completion.text);
        let response = finish(completion.text, tokens, options.wants_json);
        if let Some(cache) = cache {
            cache.put(key, response.clone()).await;
        }
        Ok(response)
    }

    fn resolve_deadline(&self, requested: Option<Duration>) -> Duration {
        requested
            .filter(|d| !d.is_zero())
            .unwrap_or(self.default_deadline)
    }

    /// Run one provider call on the pool.
    ///
    /// Capability errors propagate as [`GatewayError::Unsupported`]; every
    /// other failure becomes an [`ErrorKind`] carried in the response.
    async fn dispatch<F>(
        &self,
        operation: &'static str,
        deadline: Duration,
        call: F,
    ) -> GatewayResult<Result<Completion, ErrorKind>>
    where
        F: Future<Output = Result<Completion, ProviderError>> + Send + 'static,
    {
        let start = Instant::now();
        let outcome = match self.pool.run(deadline, call).await {
            Ok(Ok(completion)) => {
                info!(
                    provider = self.provider.name(),
                    "LLM response received in {:.2}s",
                    start.elapsed().as_secs_f64()
                );
                Ok(completion)
            }
            Ok(Err(e)) if e.is_unsupported() => {
                return Err(GatewayError::Unsupported {
                    provider: self.provider.name().to_string(),
                    operation,
                });
            }
            Ok(Err(e)) => {
                warn!(provider = self.provider.name(), "LLM request failed: {e}");
                Err(ErrorKind::ProviderFailure {
                    message: e.message,
                    status_code: e.status_code,
                })
            }
            Err(PoolError::DeadlineExceeded(_)) => {
                warn!(
                    provider = self.provider.name(),
                    "LLM request timed out after {:?}", deadline
                );
                Err(ErrorKind::timeout(deadline))
            }
            Err(e) => {
                warn!(provider = self.provider.name(), "LLM worker failed: {e}");
                Err(ErrorKind::ProviderFailure {
                    message: e.to_string(),
                    status_code: None,
                })
            }
        };
        Ok(outcome)
    }
}

fn finish(text: String, tokens: u32, wants_json: bool) -> LlmResponse {
    let parsed = if wants_json {
        let parsed = extract_json(Some(&text));
        if parsed.is_none() {
            debug!("No JSON found in model output");
        }
        parsed
    } else {
        None
    };
    LlmResponse::completed(text, tokens, parsed)
}
