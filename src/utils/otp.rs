/// Length of a one-time passcode.
pub const OTP_LENGTH: usize = 6;

/// Mint a passcode: the leading hex digits of a random UUIDv4.
pub fn generate_otp_code() -> String {
    let mut code = uuid::Uuid::new_v4().simple().to_string();
    code.truncate(OTP_LENGTH);
    code
}

/// Display name for a freshly provisioned account: the local part of the
/// email with everything but ASCII alphanumerics stripped.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let name: String = local.chars().filter(char::is_ascii_alphanumeric).collect();
    if name.is_empty() {
        "user".to_string()
    } else {
        name
    }
}
