/// Name + sharing policy used to look up already-created resources.
///
/// A shared locator (a location with a signature other than
/// [`Locator::NON_SHARED_SIGNATURE`]) makes the manager return the existing
/// resource instead of creating a second one. Unnamed locators never share.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Locator {
    location: Option<String>,
    signature: u32,
}

impl Locator {
    pub const DEFAULT_SIGNATURE: u32 = 0xFFFF_FFFE;
    pub const NON_SHARED_SIGNATURE: u32 = 0xFFFF_FFFF;

    /// A locator that never shares: every creation makes a new resource.
    pub const fn non_shared() -> Self {
        Self {
            location: None,
            signature: Self::NON_SHARED_SIGNATURE,
        }
    }

    /// A shared locator with the default signature.
    pub fn shared(location: impl Into<String>) -> Self {
        Self::with_signature(location, Self::DEFAULT_SIGNATURE)
    }

    pub fn with_signature(location: impl Into<String>, signature: u32) -> Self {
        Self {
            location: Some(location.into()),
            signature,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn signature(&self) -> u32 {
        self.signature
    }

    pub fn is_shared(&self) -> bool {
        self.location.is_some() && self.signature != Self::NON_SHARED_SIGNATURE
    }
}

impl Default for Locator {
    fn default() -> Self {
        Self::non_shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_does_not_share() {
        let loc = Locator::default();
        assert!(!loc.is_shared());
        assert_eq!(loc.location(), None);
    }

    #[test]
    fn shared_uses_default_signature() {
        let loc = Locator::shared("shapes");
        assert!(loc.is_shared());
        assert_eq!(loc.signature(), Locator::DEFAULT_SIGNATURE);
        assert_eq!(loc.location(), Some("shapes"));
    }

    #[test]
    fn named_but_non_shared_signature_does_not_share() {
        let loc = Locator::with_signature("shapes", Locator::NON_SHARED_SIGNATURE);
        assert!(!loc.is_shared());
    }

    #[test]
    fn signatures_distinguish_locators() {
        assert_ne!(
            Locator::with_signature("shapes", 1),
            Locator::with_signature("shapes", 2)
        );
    }
}
