//! Track listing scopes, pagination and ranking
//!
//! The Postgres repository expresses these rules in SQL; the in-memory
//! repository applies them directly through [`rank_page`]. Both must agree.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::models::track::{Track, TrackListing, TrackListQuery};

/// Page used when the query has none
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the query has none
pub const DEFAULT_LIMIT: u32 = 10;

/// Which tracks are eligible for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackScope {
    /// Every track
    Global,
    /// Tracks attached to one playlist
    Playlist(Uuid),
    /// Tracks the requester liked
    Liked,
    /// Tracks by one author
    Author(Uuid),
}

impl TrackScope {
    /// Filter predicate for this scope
    pub fn matches(&self, track: &Track, requester: Uuid) -> bool {
        match *self {
            TrackScope::Global => true,
            TrackScope::Playlist(playlist) => track.playlist == playlist,
            TrackScope::Liked => track.is_liked_by(requester),
            TrackScope::Author(author) => track.author == author,
        }
    }

    /// Liked-only listings are chronological, the rest are popularity ranked
    pub fn ranking(&self) -> Ranking {
        match self {
            TrackScope::Liked => Ranking::Newest,
            _ => Ranking::Popular,
        }
    }
}

/// Sort order applied after filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Like count, then requester-liked, then newest
    Popular,
    /// Newest first
    Newest,
}

impl Ranking {
    /// Compare two listed tracks; `Less` means `a` is shown first
    pub fn compare(&self, a: &TrackListing, b: &TrackListing) -> Ordering {
        let primary = match self {
            Ranking::Popular => b
                .liked_length
                .cmp(&a.liked_length)
                .then_with(|| b.liked.cmp(&a.liked)),
            Ranking::Newest => Ordering::Equal,
        };

        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Apply defaults and clamp `limit` into `1..=max_limit`; page 0 reads as 1
    pub fn from_query(query: &TrackListQuery, max_limit: u32) -> Self {
        let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, max_limit.max(1));
        Self { page, limit }
    }

    /// Number of ranked entries before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// Sort `listings` for `scope` and cut out the requested page
pub fn rank_page(
    mut listings: Vec<TrackListing>,
    scope: &TrackScope,
    page: PageRequest,
) -> Vec<TrackListing> {
    let ranking = scope.ranking();
    listings.sort_by(|a, b| ranking.compare(a, b));

    let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
    listings
        .into_iter()
        .skip(skip)
        .take(page.limit as usize)
        .collect()
}
