use super::parse_bool_env;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Route groups that get their own token bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitGroup {
    /// OTP issuance and verification.
    Otp,
    /// Published page lookups.
    PublicPages,
    /// Authenticated page editing.
    Protected,
}

impl RateLimitGroup {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "otp" => Some(Self::Otp),
            "public" | "pages" | "public_pages" | "public-pages" => Some(Self::PublicPages),
            "protected" => Some(Self::Protected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub otp: RateLimitRule,
    pub public_pages: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            otp: RateLimitRule::new(2, 5),
            public_pages: RateLimitRule::new(30, 60),
            protected: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            match parse_rate_limit_config(&raw) {
                Ok(overrides) => {
                    for (group, rule) in overrides {
                        cfg.apply(group, rule);
                    }
                }
                Err(err) => {
                    tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
                }
            }
        }

        cfg
    }

    /// `None` applies the rule to every group.
    fn apply(&mut self, group: Option<RateLimitGroup>, rule: RateLimitRule) {
        match group {
            None => {
                self.otp = rule;
                self.public_pages = rule;
                self.protected = rule;
            }
            Some(RateLimitGroup::Otp) => self.otp = rule,
            Some(RateLimitGroup::PublicPages) => self.public_pages = rule,
            Some(RateLimitGroup::Protected) => self.protected = rule,
        }
    }
}

/// Accepts either `"10:20"` (all groups) or `"otp=1:3,public=30:60"`.
fn parse_rate_limit_config(
    raw: &str,
) -> Result<Vec<(Option<RateLimitGroup>, RateLimitRule)>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    if !trimmed.contains('=') {
        return Ok(vec![(None, parse_rule(trimmed)?)]);
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (name, raw_rule) = item
                .split_once('=')
                .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
            let group = RateLimitGroup::parse(name).ok_or_else(|| {
                format!(
                    "unknown group '{}', expected otp/public/protected",
                    name.trim()
                )
            })?;
            Ok((Some(group), parse_rule(raw_rule.trim())?))
        })
        .collect()
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 {
        return Err("per_second must be > 0".to_string());
    }
    if burst_size == 0 {
        return Err("burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}
