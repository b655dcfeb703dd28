use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use engine_logging::{engine_debug, engine_trace};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::fetch::{FetchRequest, Fetcher, IMAGE_ACCEPT};
use crate::relay;
use crate::{FailureKind, FetchError};

/// Public CORS relays, each taking the percent-encoded target URL as a suffix.
pub const PUBLIC_RELAYS: &[&str] = &[
    "https://api.allorigins.win/raw?url=",
    "https://corsproxy.io/?",
    "https://api.codetabs.com/v1/proxy?quest=",
    "https://cors.bridged.cc/",
    "https://cors-proxy.htmldriven.com/?url=",
    "https://crossorigin.me/",
    "https://yacdn.org/proxy/",
    "https://api.codetabs.com/v1/proxy/?quest=",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyEndpoint {
    /// `<base><percent-encoded-target>`, fetched with GET.
    Prefix(String),
    /// A relay function: JSON POST `{url}`, JSON reply with base64 data.
    Relay(String),
}

impl ProxyEndpoint {
    pub fn public_relays() -> Vec<Self> {
        PUBLIC_RELAYS
            .iter()
            .map(|base| ProxyEndpoint::Prefix((*base).to_string()))
            .collect()
    }

    pub fn base(&self) -> &str {
        match self {
            ProxyEndpoint::Prefix(base) | ProxyEndpoint::Relay(base) => base,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(self.base())
            .map(|_| ())
            .map_err(|err| ConfigError::InvalidProxy {
                endpoint: self.base().to_string(),
                reason: err.to_string(),
            })
    }

    /// Builds the outbound request that asks this endpoint for `target`.
    pub fn request_for(&self, target: &str) -> Result<FetchRequest, FetchError> {
        match self {
            ProxyEndpoint::Prefix(base) => Ok(FetchRequest::get(format!(
                "{base}{}",
                urlencoding::encode(target)
            ))
            .header("Accept", IMAGE_ACCEPT)),
            ProxyEndpoint::Relay(endpoint) => relay::request(endpoint, target),
        }
    }

    async fn attempt(&self, fetcher: &dyn Fetcher, target: &str) -> Result<RaceWin, FetchError> {
        let request = self.request_for(target)?;
        engine_trace!("proxy leg {} -> {}", self.base(), request.url);
        let output = fetcher.fetch(request).await?;
        let (bytes, content_type) = match self {
            ProxyEndpoint::Prefix(_) => {
                let output = output.require_image()?;
                (output.bytes, output.content_type)
            }
            ProxyEndpoint::Relay(_) => {
                let payload = relay::decode_reply(&output.bytes)?;
                if !crate::fetch::is_image_content_type(payload.content_type.as_deref()) {
                    return Err(FetchError::new(
                        FailureKind::WrongContentType {
                            content_type: payload
                                .content_type
                                .unwrap_or_else(|| "missing".to_string()),
                        },
                        format!("relay {} did not return an image", self.base()),
                    ));
                }
                (payload.bytes, payload.content_type)
            }
        };
        Ok(RaceWin {
            bytes,
            content_type,
            endpoint: self.clone(),
        })
    }
}

/// Immutable endpoint list shared by every race in a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyList(Arc<[ProxyEndpoint]>);

impl ProxyList {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self(endpoints.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyEndpoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ProxyEndpoint>> for ProxyList {
    fn from(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self::new(endpoints)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceSettings {
    /// Budget for a single endpoint.
    pub leg_timeout: Duration,
    /// Budget for the whole race, independent of the legs.
    pub race_timeout: Duration,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            leg_timeout: Duration::from_secs(5),
            race_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceWin {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub endpoint: ProxyEndpoint,
}

/// Asks every endpoint for `target` at once and returns the first image.
///
/// Losing legs are dropped (and with them their in-flight requests) as soon
/// as a winner is found. Individual leg errors are only logged; the caller
/// sees one aggregate failure.
pub async fn race(
    fetcher: &dyn Fetcher,
    proxies: &ProxyList,
    target: &str,
    settings: RaceSettings,
) -> Result<RaceWin, FetchError> {
    if proxies.is_empty() {
        return Err(FetchError::new(
            FailureKind::AllProxiesFailed { attempted: 0 },
            "no proxies configured",
        ));
    }

    let mut legs: FuturesUnordered<_> = proxies
        .iter()
        .map(|endpoint| async move {
            let outcome =
                match tokio::time::timeout(settings.leg_timeout, endpoint.attempt(fetcher, target))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(FetchError::new(
                        FailureKind::Timeout,
                        format!("no answer within {:?}", settings.leg_timeout),
                    )),
                };
            (endpoint, outcome)
        })
        .collect();
    let attempted = legs.len();

    let first_success = async {
        while let Some((endpoint, outcome)) = legs.next().await {
            match outcome {
                Ok(win) => return Some(win),
                Err(err) => {
                    engine_debug!("proxy {} failed for {}: {}", endpoint.base(), target, err)
                }
            }
        }
        None
    };

    match tokio::time::timeout(settings.race_timeout, first_success).await {
        Ok(Some(win)) => {
            engine_debug!("proxy {} won the race for {}", win.endpoint.base(), target);
            Ok(win)
        }
        Ok(None) => Err(FetchError::new(
            FailureKind::AllProxiesFailed { attempted },
            format!("no proxy returned an image for {target}"),
        )),
        Err(_) => Err(FetchError::new(
            FailureKind::Timeout,
            format!(
                "proxy race for {target} produced no winner within {:?}",
                settings.race_timeout
            ),
        )),
    }
}
