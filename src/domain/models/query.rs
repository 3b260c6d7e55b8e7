//! Paging and filtering vocabulary shared by the store and the API.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::review::{Review, StallId};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Zero-based page request. Sizes are clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cuts the requested page out of an already ordered result set.
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len() as u64;
        let total_pages = total_elements.div_ceil(u64::from(request.size)) as u32;
        let content = items
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Ordering of a stall's review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StallReviewSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Most liked first, newest first among ties.
    MostLiked,
}

impl FromStr for StallReviewSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "newest" => Ok(Self::Newest),
            "likes" | "likesCount" => Ok(Self::MostLiked),
            other => Err(format!("unsupported sort: {}", other)),
        }
    }
}

impl StallReviewSort {
    pub fn compare(self, a: &Review, b: &Review) -> Ordering {
        match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::MostLiked => b
                .likes_count
                .cmp(&a.likes_count)
                .then_with(|| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Rating,
    LikesCount,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "rating" => Ok(Self::Rating),
            "likesCount" | "likes" => Ok(Self::LikesCount),
            other => Err(format!("unsupported sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unsupported sort direction: {}", other)),
        }
    }
}

/// Admin search over the whole corpus. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    /// Case-insensitive substring of stall name, username or comment.
    pub keyword: Option<String>,
    pub rating: Option<u8>,
    pub stall_id: Option<StallId>,
    pub user_id: Option<String>,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl ReviewFilter {
    pub fn matches(&self, review: &Review) -> bool {
        if self.rating.is_some_and(|rating| rating != review.rating) {
            return false;
        }
        if self.stall_id.is_some_and(|stall_id| stall_id != review.stall_id) {
            return false;
        }
        if self.user_id.as_deref().is_some_and(|user_id| user_id != review.user_id) {
            return false;
        }
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => {
                let needle = keyword.to_lowercase();
                [
                    review.stall_name.as_deref(),
                    Some(review.username.as_str()),
                    review.comment.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    pub fn compare(&self, a: &Review, b: &Review) -> Ordering {
        let ordering = match self.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Rating => a.rating.cmp(&b.rating),
            SortField::LikesCount => a.likes_count.cmp(&b.likes_count),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}
