// Authentication for probes
// The target's token is opaque: it is forwarded as a bearer credential, never inspected

pub trait AuthStrategy: Send + Sync {
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder;
}

/// Sends requests as-is
pub struct NoAuth;

impl AuthStrategy for NoAuth {
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req
    }
}

pub struct BearerTokenAuth {
    pub token: String,
}

impl AuthStrategy for BearerTokenAuth {
    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
    }
}

/// Pick the strategy for a target's optional token. Blank tokens count as absent.
pub fn strategy_for(token: Option<&str>) -> Box<dyn AuthStrategy> {
    match token.map(str::trim) {
        Some(t) if !t.is_empty() => Box::new(BearerTokenAuth { token: t.to_string() }),
        _ => Box::new(NoAuth),
    }
}
