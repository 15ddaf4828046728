// ABOUTME: User-Agent sources used when a fetch supplies no explicit headers.
// ABOUTME: RandomUserAgent picks from a pool of browser strings; FixedUserAgent makes fetches deterministic.

use rand::seq::SliceRandom;

/// Browser User-Agent strings rotated through for default headers.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (compatible; MSIE 10.0; Macintosh; Intel Mac OS X 10_7_3; Trident/6.0)",
    "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.2 (KHTML, like Gecko) Chrome/22.0.1216.0 Safari/537.2",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_7_4) AppleWebKit/537.13 (KHTML, like Gecko) Chrome/24.0.1290.1 Safari/537.13",
    "Mozilla/5.0 (X11; CrOS i686 2268.111.0) AppleWebKit/536.11 (KHTML, like Gecko) Chrome/20.0.1132.57 Safari/536.11",
    "Mozilla/5.0 (Windows NT 6.2; Win64; x64; rv:16.0.1) Gecko/20121011 Firefox/16.0.1",
    "Mozilla/5.0 (iPad; CPU OS 6_0 like Mac OS X) AppleWebKit/536.26 (KHTML, like Gecko) Version/6.0 Mobile/10A5355d Safari/8536.25",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Supplies a User-Agent header value.
pub trait UserAgentSource: Send + Sync + std::fmt::Debug {
    fn next(&self) -> String;
}

/// Picks a random entry from [`USER_AGENTS`] on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomUserAgent;

impl UserAgentSource for RandomUserAgent {
    fn next(&self) -> String {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }
}

/// Always returns the same User-Agent.
#[derive(Debug, Clone)]
pub struct FixedUserAgent(pub String);

impl UserAgentSource for FixedUserAgent {
    fn next(&self) -> String {
        self.0.clone()
    }
}
