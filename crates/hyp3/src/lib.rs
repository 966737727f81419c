//! Client for the HyP3 subscriptions API.
//!
//! A subscription is a standing search request: a time window, an area of
//! interest, and a processing job specification. HyP3 continuously matches
//! new satellite scenes against every enabled subscription and schedules the
//! specified job for each match. This crate covers the subset of the API the
//! flood monitoring pipeline drives: querying subscriptions by name,
//! creating them (with an optional validate-only mode), and updating the
//! mutable fields of existing ones.
//!
//! Authentication goes through Earthdata URS; see [`Hyp3Client::login`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod models;

pub use client::Hyp3Client;
pub use error::Hyp3Error;
pub use models::{
    JobParameters, JobSpecification, NewSubscription, SearchParameters, Subscription,
    SubscriptionUpdate, SubscriptionsResponse,
};
