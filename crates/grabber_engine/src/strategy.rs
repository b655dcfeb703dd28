use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use grabber_core::TaskIndex;

use crate::config::EngineConfig;
use crate::fetch::{FetchOutput, FetchRequest, Fetcher, IMAGE_ACCEPT};
use crate::proxy::{self, ProxyList, RaceSettings};
use crate::render::{DecodeRenderer, Renderer};
use crate::{
    FailureKind, FailureReason, FetchError, RetrievalFailure, RetrievalResult, StageFailure,
    StrategyKind,
};

/// One way of getting image bytes for a URL.
pub enum Strategy {
    Direct {
        timeout: Duration,
        origin: Option<String>,
        require_image: bool,
    },
    ProxyRace {
        proxies: ProxyList,
        settings: RaceSettings,
    },
    Rendered {
        renderer: Arc<dyn Renderer>,
        timeout: Duration,
    },
}

/// Bytes produced by a single successful strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub bytes: bytes::Bytes,
    pub content_type: Option<String>,
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Direct { .. } => StrategyKind::Direct,
            Strategy::ProxyRace { .. } => StrategyKind::ProxyRace,
            Strategy::Rendered { .. } => StrategyKind::Rendered,
        }
    }

    pub async fn attempt(&self, fetcher: &dyn Fetcher, url: &str) -> Result<Attempt, FetchError> {
        match self {
            Strategy::Direct {
                timeout,
                origin,
                require_image,
            } => {
                let mut request = FetchRequest::get(url).header("Accept", IMAGE_ACCEPT);
                if let Some(origin) = origin {
                    request = request.header("Origin", origin.clone());
                }
                let output = with_timeout(*timeout, fetcher.fetch(request)).await?;
                let output: FetchOutput = if *require_image {
                    output.require_image()?
                } else {
                    output
                };
                Ok(Attempt {
                    bytes: output.bytes,
                    content_type: output.content_type,
                })
            }
            Strategy::ProxyRace { proxies, settings } => {
                let win = proxy::race(fetcher, proxies, url, *settings).await?;
                Ok(Attempt {
                    bytes: win.bytes,
                    content_type: win.content_type,
                })
            }
            Strategy::Rendered { renderer, timeout } => {
                let rendered = with_timeout(*timeout, renderer.render(url)).await?;
                Ok(Attempt {
                    bytes: rendered.bytes,
                    content_type: Some(rendered.content_type),
                })
            }
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::new(
            FailureKind::Timeout,
            format!("stage exceeded {limit:?}"),
        )),
    }
}

/// Runs strategies in order until one yields bytes.
pub struct StrategyChain {
    fetcher: Arc<dyn Fetcher>,
    stages: Vec<Strategy>,
}

impl StrategyChain {
    pub fn new(fetcher: Arc<dyn Fetcher>, stages: Vec<Strategy>) -> Self {
        Self { fetcher, stages }
    }

    /// Direct fetch, proxy race, then (if enabled) the rendered fallback.
    pub fn from_config(config: &EngineConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let mut stages = vec![
            Strategy::Direct {
                timeout: config.direct_timeout(),
                origin: config.origin.clone(),
                require_image: config.enforce_direct_content_type,
            },
            Strategy::ProxyRace {
                proxies: ProxyList::new(config.proxies.clone()),
                settings: config.race_settings(),
            },
        ];
        if config.rendered_fallback {
            stages.push(Strategy::Rendered {
                renderer: Arc::new(DecodeRenderer::new(fetcher.clone(), config.jpeg_quality)),
                timeout: config.render_timeout(),
            });
        }
        Self::new(fetcher, stages)
    }

    pub fn stages(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.stages.iter().map(Strategy::kind)
    }

    pub async fn retrieve(
        &self,
        task_index: TaskIndex,
        url: &str,
    ) -> Result<RetrievalResult, RetrievalFailure> {
        let mut attempts = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            match stage.attempt(self.fetcher.as_ref(), url).await {
                Ok(attempt) => {
                    engine_info!(
                        "image {} retrieved via {} ({} bytes)",
                        task_index + 1,
                        stage.kind(),
                        attempt.bytes.len()
                    );
                    return Ok(RetrievalResult {
                        task_index,
                        bytes: attempt.bytes,
                        content_type: attempt.content_type,
                        strategy: stage.kind(),
                    });
                }
                Err(error) => {
                    engine_debug!(
                        "{} failed for image {}: {}",
                        stage.kind(),
                        task_index + 1,
                        error
                    );
                    attempts.push(StageFailure {
                        strategy: stage.kind(),
                        error,
                    });
                }
            }
        }

        let mut failure =
            RetrievalFailure::new(task_index, url, FailureReason::AllStrategiesExhausted);
        failure.attempts = attempts;
        Err(failure)
    }
}
