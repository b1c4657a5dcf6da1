// Profile store - session-scoped user preferences, replaced wholesale on save

use super::types::UserProfile;
use tokio::sync::watch;
use tracing::info;

/// Holds the current profile; readers get snapshots, writers replace it whole
pub struct ProfileStore {
    current: watch::Sender<UserProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::with_profile(UserProfile::default())
    }

    pub fn with_profile(profile: UserProfile) -> Self {
        let (current, _) = watch::channel(profile);
        Self { current }
    }

    /// Copy of the profile as it is right now
    pub fn snapshot(&self) -> UserProfile {
        self.current.borrow().clone()
    }

    /// Replace the profile. Only requests started afterwards see it.
    pub fn save(&self, profile: UserProfile) {
        info!(
            preferred = profile.preferred_styles.len(),
            has_colors = !profile.favorite_colors.trim().is_empty(),
            has_dislikes = !profile.disliked.trim().is_empty(),
            "profile saved"
        );
        self.current.send_replace(profile);
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::types::ClothingStyle;

    #[test]
    fn test_starts_empty() {
        assert!(ProfileStore::new().snapshot().is_empty());
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let store = ProfileStore::with_profile(
            UserProfile::default()
                .with_preferred_style(ClothingStyle::Classic)
                .with_favorite_colors("beige"),
        );

        store.save(UserProfile::default().with_disliked("animal prints"));

        let profile = store.snapshot();
        assert!(profile.preferred_styles.is_empty());
        assert_eq!(profile.favorite_colors, "");
        assert_eq!(profile.disliked, "animal prints");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = ProfileStore::new();
        let before = store.snapshot();
        store.save(UserProfile::default().with_favorite_colors("navy blue"));
        assert!(before.is_empty());
        assert_eq!(store.snapshot().favorite_colors, "navy blue");
    }
}
