#[derive(Debug, Clone)]
pub struct AwsCredentials {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key: String,
        secret_key: String,
        session_token: Option<String>,
    ) -> AwsCredentials {
        AwsCredentials {
            access_key,
            secret_key,
            session_token,
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}
