//! # Domain Models
//!
//! These structs represent the core entities of the yakboard feed.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// A WGS84 coordinate pair. Stored as plain degrees; all distance math
/// lives in the services crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let point = GeoPoint { latitude, longitude };
        point.validate()?;
        Ok(point)
    }

    /// Rejects coordinates outside the WGS84 envelope, including NaN.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::ValidationError(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::ValidationError(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// What a vote attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Post,
    Comment,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Post => "post",
            SubjectKind::Comment => "comment",
        }
    }
}

/// A votable subject: a post or a comment, identified by kind + id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteSubject {
    pub kind: SubjectKind,
    pub id: Uuid,
}

impl VoteSubject {
    pub fn post(id: Uuid) -> Self {
        VoteSubject { kind: SubjectKind::Post, id }
    }

    pub fn comment(id: Uuid) -> Self {
        VoteSubject { kind: SubjectKind::Comment, id }
    }
}

/// A single vote's weight. Only +1 and -1 exist; "no vote" is the absence
/// of a ledger row, never a zero-valued one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteValue {
    Up,
    Down,
}

impl VoteValue {
    pub fn as_i64(&self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = AppError;

    fn try_from(raw: i64) -> Result<Self, AppError> {
        match raw {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            other => Err(AppError::ValidationError(format!(
                "vote value must be 1 or -1, got {other}"
            ))),
        }
    }
}

/// The fundamental unit of the feed ("yak").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub location: GeoPoint,
    /// Herd this post is scoped to, if any. Community posts bypass the
    /// feed's radius filter but never the expiry filter.
    pub community_id: Option<Uuid>,
    /// Present iff this is a ghost post. Visibility ends strictly before
    /// this instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Cache of the aggregator's output. Reconcilable from the ledger at
    /// any time; never authoritative on its own.
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_ghost(&self) -> bool {
        self.expires_at.is_some()
    }
}

/// A reply on a post. `parent_id` points at another comment on the same
/// post, or is None for a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<Uuid>,
    /// Cache of the aggregator's output, same rules as `Post::score`.
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

/// A geofenced named group ("herd").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub created_at: DateTime<Utc>,
}

/// Role within a herd. Moderators may hard-delete any post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Member,
    Moderator,
}

/// Membership relation, kept separate from the community record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMember {
    pub community_id: Uuid,
    pub voter_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Minimal identity record: a stable id plus a generated anonymous handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub handle: String,
    pub karma: i64,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

/// Preset visibility windows for ghost posts. The duration table is
/// fixed here so every caller resolves the same absolute expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostDuration {
    OneHour,
    TwelveHours,
    OneDay,
    TwoDays,
    OneWeek,
}

impl GhostDuration {
    pub fn expires_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let span = match self {
            GhostDuration::OneHour => Duration::hours(1),
            GhostDuration::TwelveHours => Duration::hours(12),
            GhostDuration::OneDay => Duration::hours(24),
            GhostDuration::TwoDays => Duration::hours(48),
            GhostDuration::OneWeek => Duration::days(7),
        };
        now + span
    }
}

/// Narrowing hints passed to the store when listing feed candidates.
/// The store may over-return; the composer re-filters everything.
#[derive(Debug, Clone, Default)]
pub struct FeedHints {
    /// Restrict candidates to a single herd.
    pub community_id: Option<Uuid>,
    /// Upper bound on candidates fetched from the store.
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_value_round_trips_and_rejects_junk() {
        assert_eq!(VoteValue::try_from(1).unwrap(), VoteValue::Up);
        assert_eq!(VoteValue::try_from(-1).unwrap(), VoteValue::Down);
        assert!(VoteValue::try_from(0).is_err());
        assert!(VoteValue::try_from(2).is_err());
    }

    #[test]
    fn geo_point_validation() {
        assert!(GeoPoint::new(0.0, 0.0).is_ok());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
        assert!(GeoPoint::new(90.1, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn ghost_duration_resolves_fixed_units() {
        let now = Utc::now();
        assert_eq!(
            GhostDuration::OneHour.expires_from(now),
            now + Duration::minutes(60)
        );
        assert_eq!(
            GhostDuration::OneWeek.expires_from(now),
            now + Duration::days(7)
        );
    }

    #[test]
    fn post_ghost_flag_follows_expiry() {
        let post = Post {
            id: Uuid::now_v7(),
            author_id: Uuid::now_v7(),
            content: "hello".into(),
            location: GeoPoint { latitude: 0.0, longitude: 0.0 },
            community_id: None,
            expires_at: None,
            score: 0,
            created_at: Utc::now(),
        };
        assert!(!post.is_ghost());
    }
}
