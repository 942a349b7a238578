//! # services
//!
//! The content ranking and visibility engine. Pure policy lives in
//! `geo`, `expiry`, and `thread`; the stateful services coordinate the
//! vote ledger, score cache, and feed composition through the domain
//! ports. No ambient state: viewer location and clock are threaded into
//! every call that needs them.

pub mod comments;
pub mod communities;
pub mod expiry;
pub mod feed;
pub mod geo;
pub mod handles;
pub mod moderation;
pub mod posts;
pub mod thread;
pub mod votes;

pub use comments::{CommentService, NewComment};
pub use communities::{CommunityService, NewCommunity};
pub use feed::FeedComposer;
pub use posts::{NewPost, PostService};
pub use thread::{build_forest, CommentNode};
pub use votes::{VoteOutcome, VoteService};
