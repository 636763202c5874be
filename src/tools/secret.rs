use core::fmt::Debug;

use secrecy::{ExposeSecret, SecretBox};
use zeroize::Zeroize;

/// A helper wrapper for managing secret values (witnesses, protocol randomness, trapdoors).
///
/// On top of `secrecy::SecretBox` functionality, it provides:
/// - Safe `Clone` implementation (without needing to impl `CloneableSecret`)
/// - Safe `Debug` implementation
pub(crate) struct Secret<T: Zeroize>(SecretBox<T>);

impl<T> Secret<T>
where
    T: Zeroize,
{
    pub fn expose_secret(&self) -> &T {
        self.0.expose_secret()
    }
}

impl<T> Secret<T>
where
    T: Zeroize + Clone,
{
    pub fn init_with(ctr: impl FnOnce() -> T) -> Self {
        Self(SecretBox::init_with(ctr))
    }

    /// Applies a function to the secret value, producing a new secret.
    pub fn map<U: Zeroize + Clone>(&self, f: impl FnOnce(&T) -> U) -> Secret<U> {
        Secret::init_with(|| f(self.expose_secret()))
    }
}

impl<T> Clone for Secret<T>
where
    T: Zeroize + Clone,
{
    fn clone(&self) -> Self {
        Self::init_with(|| self.0.expose_secret().clone())
    }
}

impl<T> Debug for Secret<T>
where
    T: Zeroize,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Secret<{}>(...)", core::any::type_name::<T>())
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::Secret;

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::init_with(|| 0xdead_beefu64);
        let printed = format!("{:?}", secret);
        assert!(!printed.contains("3735928559"));
        assert_eq!(*secret.map(|x| x + 1).expose_secret(), 0xdead_bef0);
    }
}
