use std::env;

const DEFAULT_OTP_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    /// How long an issued one-time passcode stays valid.
    pub otp_ttl: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl: chrono::Duration::seconds(DEFAULT_OTP_TTL_SECONDS),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let seconds = env::var("OTP_TTL_SECONDS")
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_OTP_TTL_SECONDS);

        Self {
            otp_ttl: chrono::Duration::seconds(seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_one_hour() {
        assert_eq!(AuthConfig::default().otp_ttl, chrono::Duration::hours(1));
    }
}
