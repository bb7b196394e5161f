use chrono::{
  DateTime,
  Utc
};
use serde::{
  Deserialize,
  Serialize
};

pub const LOCAL_AUTHOR: &str = "You";
pub const ANONYMOUS_AUTHOR: &str =
  "Anonymous";

/// Reaction counters as the remote
/// source reports them: older
/// payloads carry a bare number, newer
/// ones a likes/dislikes pair.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(untagged)]
pub enum Reactions {
  Count(u64),
  Split {
    #[serde(default)]
    likes:    u64,
    #[serde(default)]
    dislikes: u64
  }
}

impl Default for Reactions {
  fn default() -> Self {
    Self::Count(0)
  }
}

impl Reactions {
  pub fn likes(&self) -> u64 {
    match self {
      | Self::Count(count) => *count,
      | Self::Split {
        likes, ..
      } => *likes
    }
  }

  pub fn dislikes(
    &self
  ) -> Option<u64> {
    match self {
      | Self::Count(_) => None,
      | Self::Split {
        dislikes,
        ..
      } => Some(*dislikes)
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct CommentUser {
  pub username:  String,
  #[serde(
    default,
    rename = "fullName",
    skip_serializing_if = "Option::is_none"
  )]
  pub full_name: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Comment {
  pub id:         u64,
  #[serde(default)]
  pub body:       String,
  #[serde(default)]
  pub user:       Option<CommentUser>,
  #[serde(
    default,
    rename = "postId",
    skip_serializing_if = "Option::is_none"
  )]
  pub post_id:    Option<u64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub likes:      Option<u64>,
  #[serde(
    default,
    rename = "createdAt",
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at: Option<DateTime<Utc>>
}

impl Comment {
  /// A comment authored in this client.
  /// It never leaves the local key-value
  /// store.
  pub fn local(
    id: u64,
    body: impl Into<String>,
    now: DateTime<Utc>
  ) -> Self {
    Self {
      id,
      body: body.into(),
      user: Some(CommentUser {
        username:  LOCAL_AUTHOR
          .to_string(),
        full_name: None
      }),
      post_id: None,
      likes: None,
      created_at: Some(now)
    }
  }

  pub fn author(&self) -> &str {
    self
      .user
      .as_ref()
      .map(|user| user.username.as_str())
      .filter(|name| !name.is_empty())
      .unwrap_or(ANONYMOUS_AUTHOR)
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct Post {
  pub id:        u64,
  #[serde(default)]
  pub title:     String,
  #[serde(default)]
  pub body:      String,
  #[serde(default)]
  pub tags:      Vec<String>,
  #[serde(default)]
  pub reactions: Reactions,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub image:     Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub thumbnail: Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub views:     Option<u64>,
  #[serde(
    default,
    rename = "userId",
    skip_serializing_if = "Option::is_none"
  )]
  pub user_id:   Option<u64>,
  #[serde(
    default,
    skip_serializing_if = "Vec::is_empty"
  )]
  pub comments:  Vec<Comment>
}

impl Post {
  pub fn has_tag(
    &self,
    tag: &str
  ) -> bool {
    self
      .tags
      .iter()
      .any(|value| value == tag)
  }

  pub fn title_excerpt(
    &self,
    max_chars: usize
  ) -> String {
    excerpt(&self.title, max_chars)
  }

  pub fn body_excerpt(
    &self,
    max_chars: usize
  ) -> String {
    excerpt(&self.body, max_chars)
  }

  pub fn image_url(&self) -> String {
    let usable = |url: &&str| {
      !url.trim().is_empty()
    };
    self
      .image
      .as_deref()
      .filter(usable)
      .or(
        self
          .thumbnail
          .as_deref()
          .filter(usable)
      )
      .map(str::to_string)
      .unwrap_or_else(|| {
        placeholder_image(self.id)
      })
  }
}

pub fn placeholder_image(
  id: u64
) -> String {
  format!(
    "https://picsum.photos/seed/{id}/300/150"
  )
}

/// Cuts `text` to `max_chars`
/// characters and marks the cut with
/// `...`.
pub fn excerpt(
  text: &str,
  max_chars: usize
) -> String {
  match text.char_indices().nth(max_chars)
  {
    | Some((byte_idx, _)) => {
      format!("{}...", &text[..byte_idx])
    }
    | None => text.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reactions_accept_both_shapes() {
    let count: Reactions =
      serde_json::from_str("7")
        .expect("count");
    assert_eq!(count, Reactions::Count(7));
    assert_eq!(count.dislikes(), None);

    let split: Reactions =
      serde_json::from_str(
        r#"{"likes":3,"dislikes":1}"#
      )
      .expect("split");
    assert_eq!(split.likes(), 3);
    assert_eq!(split.dislikes(), Some(1));
  }

  #[test]
  fn post_defaults_missing_fields() {
    let post: Post = serde_json::from_str(
      r#"{"id":4,"title":"t","body":"b","unknown":true}"#
    )
    .expect("post");
    assert!(post.tags.is_empty());
    assert_eq!(
      post.reactions,
      Reactions::Count(0)
    );
    assert_eq!(
      post.image_url(),
      "https://picsum.photos/seed/4/300/150"
    );
  }

  #[test]
  fn empty_image_falls_back_to_thumbnail()
  {
    let post: Post = serde_json::from_str(
      r#"{"id":4,"title":"t","body":"b","image":"","thumbnail":"https://x/thumb.png"}"#
    )
    .expect("post");
    assert_eq!(
      post.image_url(),
      "https://x/thumb.png"
    );
  }

  #[test]
  fn excerpt_respects_char_boundaries() {
    assert_eq!(excerpt("short", 30), "short");
    assert_eq!(
      excerpt("héllo wörld", 5),
      "héllo..."
    );
    assert_eq!(excerpt("abc", 3), "abc");
  }

  #[test]
  fn comment_author_falls_back_to_anonymous()
  {
    let comment: Comment =
      serde_json::from_str(
        r#"{"id":1,"body":"hi"}"#
      )
      .expect("comment");
    assert_eq!(comment.author(), "Anonymous");

    let local = Comment::local(
      9,
      "mine",
      Utc::now()
    );
    assert_eq!(local.author(), "You");
  }
}
