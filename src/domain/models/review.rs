//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Review record and the inputs that create or change it.
//
// | Section   | Description                                                         |
// |-----------|---------------------------------------------------------------------|
// | STRUCTS   | Review, ReviewDraft, NewReview, ReviewPatch, Author                 |
// | FUNCTIONS | validation of ratings, comments, costs and party sizes              |
// | TESTS     | price sample and validation rules                                   |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::ValidationError;

pub type ReviewId = Uuid;
pub type StallId = i64;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_CHARS: usize = 1000;

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name        | Description                                       | Key Methods          |
// |-------------|---------------------------------------------------|----------------------|
// | Review      | Persisted review                                  | price_sample, apply  |
// | ReviewDraft | Validated review waiting for an id from the store | into_review          |
// | NewReview   | Raw create input                                  | validate, into_draft |
// | ReviewPatch | Raw partial update input                          | validate             |
// | Author      | Identity of the caller writing a review           |                      |
//--------------------------------------------------------------------------------------------------

/// A user review of one food stall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub stall_id: StallId,
    pub stall_name: Option<String>,
    pub user_id: String,
    pub username: String,
    pub user_avatar_url: Option<String>,
    /// Always within `MIN_RATING..=MAX_RATING`.
    pub rating: u8,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
    pub total_cost: Option<Decimal>,
    pub number_of_people: Option<u32>,
    pub likes_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Per-person cost this review contributes to the stall's average price.
    ///
    /// `None` unless both `total_cost` and `number_of_people` are present and
    /// the party size is positive.
    pub fn price_sample(&self) -> Option<f64> {
        match (self.total_cost, self.number_of_people) {
            (Some(cost), Some(people)) if people > 0 => (cost / Decimal::from(people)).to_f64(),
            _ => None,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Applies the present fields of a validated patch and stamps `updated_at`.
    pub fn apply(&mut self, patch: ReviewPatch, now: DateTime<Utc>) {
        if let Some(rating) = patch.rating {
            self.rating = rating as u8;
        }
        if let Some(comment) = patch.comment {
            self.comment = Some(comment);
        }
        if let Some(image_urls) = patch.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(total_cost) = patch.total_cost {
            self.total_cost = Some(total_cost);
        }
        if let Some(people) = patch.number_of_people {
            self.number_of_people = Some(people as u32);
        }
        self.updated_at = now;
    }
}

/// Everything a review holds except the id the store assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub stall_id: StallId,
    pub stall_name: Option<String>,
    pub user_id: String,
    pub username: String,
    pub user_avatar_url: Option<String>,
    pub rating: u8,
    pub comment: Option<String>,
    pub image_urls: Vec<String>,
    pub total_cost: Option<Decimal>,
    pub number_of_people: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl ReviewDraft {
    pub fn into_review(self, id: ReviewId) -> Review {
        Review {
            id,
            stall_id: self.stall_id,
            stall_name: self.stall_name,
            user_id: self.user_id,
            username: self.username,
            user_avatar_url: self.user_avatar_url,
            rating: self.rating,
            comment: self.comment,
            image_urls: self.image_urls,
            total_cost: self.total_cost,
            number_of_people: self.number_of_people,
            likes_count: 0,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Identity of the user writing a review, as forwarded by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub user_id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl Author {
    pub fn new(user_id: &str, username: &str) -> Self {
        Self {
            user_id: user_id.to_owned(),
            username: username.to_owned(),
            avatar_url: None,
        }
    }
}

/// Unvalidated input for a new review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub stall_id: StallId,
    #[serde(default)]
    pub stall_name: Option<String>,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    #[serde(default)]
    pub number_of_people: Option<i32>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)?;
        validate_comment(self.comment.as_deref())?;
        validate_total_cost(self.total_cost)?;
        validate_number_of_people(self.number_of_people)
    }

    /// Validates the input and turns it into a draft authored by `author`.
    pub fn into_draft(self, author: &Author, now: DateTime<Utc>) -> Result<ReviewDraft, ValidationError> {
        self.validate()?;
        Ok(ReviewDraft {
            stall_id: self.stall_id,
            stall_name: self.stall_name,
            user_id: author.user_id.clone(),
            username: author.username.clone(),
            user_avatar_url: author.avatar_url.clone(),
            rating: self.rating as u8,
            comment: self.comment,
            image_urls: self.image_urls,
            total_cost: self.total_cost,
            number_of_people: self.number_of_people.map(|people| people as u32),
            created_at: now,
        })
    }
}

/// Partial update. Absent fields leave the review untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPatch {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    #[serde(default)]
    pub number_of_people: Option<i32>,
}

impl ReviewPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        validate_comment(self.comment.as_deref())?;
        validate_total_cost(self.total_cost)?;
        validate_number_of_people(self.number_of_people)
    }
}

//--------------------------------------------------------------------------------------------------
//  FUNCTIONS
//--------------------------------------------------------------------------------------------------

fn validate_rating(rating: i32) -> Result<(), ValidationError> {
    if (i32::from(MIN_RATING)..=i32::from(MAX_RATING)).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

fn validate_comment(comment: Option<&str>) -> Result<(), ValidationError> {
    match comment.map(|c| c.chars().count()) {
        Some(len) if len > MAX_COMMENT_CHARS => Err(ValidationError::CommentTooLong(len)),
        _ => Ok(()),
    }
}

fn validate_total_cost(total_cost: Option<Decimal>) -> Result<(), ValidationError> {
    match total_cost {
        Some(cost) if cost.is_sign_negative() && !cost.is_zero() => Err(ValidationError::NegativeTotalCost),
        _ => Ok(()),
    }
}

fn validate_number_of_people(people: Option<i32>) -> Result<(), ValidationError> {
    match people {
        Some(n) if n < 1 => Err(ValidationError::InvalidNumberOfPeople(n)),
        _ => Ok(()),
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
