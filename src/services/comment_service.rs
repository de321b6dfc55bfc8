use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Comment, CreateCommentRequest, NewComment};
use crate::repositories::{CommentRepository, UserDirectory};

/// Upper bound for `limit` on comment listings
pub const MAX_COMMENT_LIMIT: i64 = 200;

#[derive(Error, Debug)]
pub enum CommentError {
    #[error("foodId required")]
    MissingFoodId,
    #[error("foodId and text required")]
    MissingFields,
    #[error("comment not found")]
    NotFound,
    #[error("not allowed to delete this comment")]
    Forbidden,
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserDirectory>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { comments, users }
    }

    /// Newest comments on a food item
    pub async fn list_comments(&self, food_id: &str, limit: i64) -> Result<Vec<Comment>, CommentError> {
        let food_id = food_id.trim();
        if food_id.is_empty() {
            return Err(CommentError::MissingFoodId);
        }

        let limit = limit.clamp(1, MAX_COMMENT_LIMIT);
        Ok(self.comments.list_by_food(food_id, limit).await?)
    }

    pub async fn create_comment(
        &self,
        author: &AuthUser,
        request: CreateCommentRequest,
    ) -> Result<Comment, CommentError> {
        let (Some(food_id), Some(text)) = (request.food_id(), request.text()) else {
            return Err(CommentError::MissingFields);
        };

        let comment = self
            .comments
            .insert(NewComment {
                food_id,
                text,
                author_id: author.uid.clone(),
                author_name: self.author_name(author).await,
                reply_to: request.reply_to(),
            })
            .await?;

        info!("Created comment {} on food {} by {}", comment.id, comment.food_id, author.uid);
        Ok(comment)
    }

    /// Authors may delete their own comments; admins may delete any
    pub async fn delete_comment(&self, caller: &AuthUser, comment_id: Uuid) -> Result<(), CommentError> {
        let comment = self.comments.get(comment_id).await?.ok_or(CommentError::NotFound)?;

        if comment.author_id != caller.uid && !caller.is_admin() {
            return Err(CommentError::Forbidden);
        }

        self.comments.delete(comment_id).await?;
        info!("Deleted comment {} by {}", comment_id, caller.uid);
        Ok(())
    }

    /// Directory name, then the token's name/email claims. Lookup errors are
    /// not fatal.
    async fn author_name(&self, author: &AuthUser) -> Option<String> {
        match self.users.get_profile(&author.uid).await {
            Ok(Some(profile)) => {
                if let Some(name) = profile.author_name() {
                    return Some(name);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Profile lookup for {} failed: {:#}", author.uid, e),
        }

        [&author.claims.name, &author.claims.email]
            .into_iter()
            .flatten()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }
}
