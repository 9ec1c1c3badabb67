use tracing::debug;
use uuid::Uuid;

// v4 UUIDs draw 122 bits from the OS CSPRNG.
fn generate() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_session_id() -> String {
    let id = generate();
    debug!("session id generated");
    id
}

pub fn new_reset_token() -> String {
    let token = generate();
    debug!("reset token generated");
    token
}
