//! Profile entity - a candidate presented for an accept/reject decision

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Candidate profile, owned by the external profile source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub bio: String,
    pub distance: Option<String>,
    pub images: Vec<String>,
    pub interests: BTreeSet<String>,
}

impl Profile {
    /// Create a new Profile with no images or interests
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            bio: String::new(),
            distance: None,
            images: Vec::new(),
            interests: BTreeSet::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = Some(distance.into());
        self
    }

    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// First image, used as the avatar on match and call screens
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[inline]
    pub fn has_interest(&self, tag: &str) -> bool {
        self.interests.contains(tag)
    }
}

/// Position in a profile's image list, clamped to its bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageCursor {
    index: usize,
    len: usize,
}

impl ImageCursor {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn for_profile(profile: &Profile) -> Self {
        Self::new(profile.images.len())
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next image; returns false at the last one
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous image; returns false at the first one
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_builder() {
        let profile = Profile::new("1", "Sophia", 28)
            .with_bio("Adventurous soul")
            .with_distance("3 miles away")
            .with_images(["a.jpg", "b.jpg"])
            .with_interests(["Hiking", "Yoga", "Hiking"]);

        assert_eq!(profile.primary_image(), Some("a.jpg"));
        assert_eq!(profile.interests.len(), 2);
        assert!(profile.has_interest("Yoga"));
    }

    #[test]
    fn test_image_cursor_clamps() {
        let mut cursor = ImageCursor::new(2);
        assert!(!cursor.previous());
        assert!(cursor.next());
        assert_eq!(cursor.index(), 1);
        assert!(!cursor.next());
        assert_eq!(cursor.index(), 1);
        assert!(cursor.previous());
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_image_cursor_empty() {
        let mut cursor = ImageCursor::new(0);
        assert!(!cursor.next());
        assert!(!cursor.previous());
        assert_eq!(cursor.index(), 0);
    }
}
