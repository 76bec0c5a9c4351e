/// Login form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Decides whether a set of credentials belongs to an administrator. The
/// scheme behind it (static account, directory, ...) is up to the implementor.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> bool;
}
