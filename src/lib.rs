//! Outfitter - complete outfits generated around a single clothing item.
//!
//! The [`styling`] module holds the workflow; [`config`] loads API settings.

pub mod config;
pub mod styling;

pub use styling::{Outfit, OutfitStyle, Stylist, StylistError, UserProfile};
