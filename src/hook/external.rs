// modpack: Module Packaging Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! HTTP callbacks.
//!
//! ```text
//! GET   action[?|&]k1=v1&k2=v2
//! POST  action, body k1=v1&k2=v2 (x-www-form-urlencoded)
//! ```
//!
//! Only status 200 counts as success.

use std::sync::OnceLock;

use futures_util::future::BoxFuture;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};
use url::form_urlencoded;

use super::{HookContext, Runnable};
use crate::error::{BuildError, HookError, Result};
use crate::module::CallbackAction;

/// Global HTTP client, reused across hooks.
fn global_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent(format!("modpack/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// HTTP method of an external hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Parses a method name case-insensitively; anything but GET is sent as POST.
    #[must_use]
    pub fn parse(method: Option<&str>) -> Self {
        match method {
            Some(m) if m.eq_ignore_ascii_case("get") => Self::Get,
            _ => Self::Post,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalHook {
    url: String,
    method: HttpMethod,
    parameters: Vec<(String, String)>,
}

impl ExternalHook {
    #[must_use]
    pub fn new(action: &CallbackAction) -> Self {
        let parameters = action
            .parameters
            .iter()
            .filter_map(|p| p.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            url: action.action.trim().to_string(),
            method: HttpMethod::parse(action.method.as_deref()),
            parameters,
        }
    }

    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Parameters encoded as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn encoded_parameters(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.parameters)
            .finish()
    }

    /// URL the request is sent to; GET hooks carry the parameters in the query.
    #[must_use]
    pub fn request_url(&self) -> String {
        let query = self.encoded_parameters();
        if self.method == HttpMethod::Post || query.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.url)
    }
}

impl Runnable for ExternalHook {
    fn describe(&self) -> String {
        let method = match self.method {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };
        format!("{method} {}", self.url)
    }

    fn run<'a>(&'a self, ctx: &'a HookContext) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let url = self.request_url();
            info!(hook = %self.describe(), "calling external hook");

            let request = match self.method {
                HttpMethod::Get => global_client().get(&url),
                HttpMethod::Post => global_client()
                    .post(&url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(self.encoded_parameters()),
            }
            .timeout(ctx.timeout());

            let response = tokio::select! {
                () = ctx.cancel_token().cancelled() => return Err(BuildError::Cancelled.into()),
                response = request.send() => response.map_err(|source| HookError::Request {
                    url: url.clone(),
                    source,
                })?,
            };

            let status = response.status().as_u16();
            debug!(url = %url, status, "external hook answered");
            if status != 200 {
                return Err(HookError::HttpStatus { status, url }.into());
            }
            Ok(())
        })
    }
}
