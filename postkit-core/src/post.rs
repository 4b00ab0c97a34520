//! Post values shown in the feed.

use serde::{Deserialize, Serialize};

use crate::error::{PostKitError, PostKitResult};

/// Maximum length of a post title, in characters.
pub const MAX_TITLE_LENGTH: usize = 25;

/// A single feed entry, either user-authored or from the seed dataset.
///
/// Posts carry no identifier; their position in the feed is the only handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Title, 1 to [`MAX_TITLE_LENGTH`] characters.
    pub title: String,
    /// Display name of the author.
    pub author: String,
    /// Optional body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque reference to a persisted image file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Raw input from the post creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Title as typed.
    pub title: String,
    /// Author as typed.
    pub author: String,
    /// Description as typed; blank means none.
    pub description: String,
    /// Permanent image reference produced by the image collaborator.
    pub image: Option<String>,
}

impl PostDraft {
    /// Validates the draft and builds the [`Post`] that would be saved.
    ///
    /// Title, author and description are trimmed and a blank description is
    /// dropped. The draft itself is left untouched so a rejected form keeps
    /// its input.
    ///
    /// # Errors
    ///
    /// Returns [`PostKitError::InvalidInput`] if the title is blank or longer
    /// than [`MAX_TITLE_LENGTH`], or the author is blank.
    pub fn to_post(&self) -> PostKitResult<Post> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(PostKitError::invalid_input("title", "title is required"));
        }
        let title_length = title.chars().count();
        if title_length > MAX_TITLE_LENGTH {
            return Err(PostKitError::invalid_input(
                "title",
                format!("title is {title_length} characters, maximum is {MAX_TITLE_LENGTH}"),
            ));
        }

        let author = self.author.trim();
        if author.is_empty() {
            return Err(PostKitError::invalid_input("author", "author is required"));
        }

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Post {
            title: title.to_string(),
            author: author.to_string(),
            description,
            image: self.image.clone(),
        })
    }
}
