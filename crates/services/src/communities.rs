//! # CommunityService
//!
//! Herd lifecycle and geofenced membership. Joining requires standing
//! inside the herd's circle at join time; the creator is seeded as a
//! moderator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    AppError, Community, CommunityMember, CommunityStore, GeoPoint, MemberRole, Result,
};
use tracing::info;
use uuid::Uuid;

use crate::geo;

#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub description: Option<String>,
    pub creator_id: Uuid,
    pub center: GeoPoint,
    pub radius_meters: f64,
}

#[derive(Clone)]
pub struct CommunityService {
    communities: Arc<dyn CommunityStore>,
}

impl CommunityService {
    pub fn new(communities: Arc<dyn CommunityStore>) -> Self {
        CommunityService { communities }
    }

    /// Creates a herd. Radius must be strictly positive; the creator
    /// joins immediately as a moderator.
    pub async fn create(&self, new: NewCommunity, now: DateTime<Utc>) -> Result<Community> {
        if new.name.trim().is_empty() {
            return Err(AppError::ValidationError("community name must not be empty".into()));
        }
        if !(new.radius_meters > 0.0) {
            return Err(AppError::ValidationError(format!(
                "radius must be positive, got {}",
                new.radius_meters
            )));
        }
        new.center.validate()?;

        let community = Community {
            id: Uuid::now_v7(),
            name: new.name,
            description: new.description,
            creator_id: new.creator_id,
            center: new.center,
            radius_meters: new.radius_meters,
            created_at: now,
        };
        self.communities
            .insert_community(community.clone())
            .await
            .map_err(AppError::internal)?;
        self.communities
            .add_member(community.id, new.creator_id, MemberRole::Moderator, now)
            .await
            .map_err(AppError::internal)?;
        info!(community_id = %community.id, name = %community.name, "community created");
        Ok(community)
    }

    pub async fn get(&self, id: Uuid) -> Result<Community> {
        self.communities
            .get_community(id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Community", id))
    }

    /// Geofenced join: the joiner must currently stand strictly inside
    /// the herd's radius. Duplicate joins conflict instead of silently
    /// rewriting the role.
    pub async fn join(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
        at: GeoPoint,
        now: DateTime<Utc>,
    ) -> Result<CommunityMember> {
        at.validate()?;
        let community = self.get(community_id).await?;

        if !geo::within_radius(at, community.center, community.radius_meters) {
            return Err(AppError::ValidationError(
                "you must be inside the community area to join".into(),
            ));
        }

        if self
            .communities
            .get_member(community_id, voter_id)
            .await
            .map_err(AppError::internal)?
            .is_some()
        {
            return Err(AppError::Conflict("already a member of this community".into()));
        }

        self.communities
            .add_member(community_id, voter_id, MemberRole::Member, now)
            .await
            .map_err(AppError::internal)?;
        info!(community_id = %community_id, voter = %voter_id, "member joined");
        Ok(CommunityMember {
            community_id,
            voter_id,
            role: MemberRole::Member,
            joined_at: now,
        })
    }

    pub async fn membership(
        &self,
        community_id: Uuid,
        voter_id: Uuid,
    ) -> Result<Option<CommunityMember>> {
        self.communities
            .get_member(community_id, voter_id)
            .await
            .map_err(AppError::internal)
    }

    pub async fn members(&self, community_id: Uuid) -> Result<Vec<CommunityMember>> {
        self.get(community_id).await?;
        self.communities
            .list_members(community_id)
            .await
            .map_err(AppError::internal)
    }

    /// Herds whose center lies strictly inside the viewer's radius.
    pub async fn nearby(&self, viewer: GeoPoint, radius_meters: f64) -> Result<Vec<Community>> {
        viewer.validate()?;
        let all = self
            .communities
            .list_communities()
            .await
            .map_err(AppError::internal)?;
        Ok(all
            .into_iter()
            .filter(|c| geo::within_radius(c.center, viewer, radius_meters))
            .collect())
    }
}
