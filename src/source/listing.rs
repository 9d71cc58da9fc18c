//! Wire types for the subreddit `random.json` endpoint.
//!
//! Only the fields the validator looks at are modelled; everything is
//! optional so that a missing field becomes a validation decision rather
//! than a decode error.

use serde::Deserialize;

/// A raw response from the content source, before validation.
///
/// `random.json` answers with an array of listings (the post, then its
/// comments). A bare listing object is accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Many(Vec<Listing>),
    One(Listing),
}

impl RawRecord {
    /// The first child of the first listing, if any.
    pub fn first_post(&self) -> Option<&Thing> {
        let listing = match self {
            RawRecord::Many(listings) => listings.first()?,
            RawRecord::One(listing) => listing,
        };
        listing.data.children.first()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A single listing child: a `kind` marker plus the post payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thing {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostData {
    pub title: Option<String>,
    pub subreddit: Option<String>,
    pub link: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    /// Self posts carry `self.<subreddit>` here.
    pub domain: Option<String>,
    #[serde(default)]
    pub is_self: bool,
    pub preview: Option<Preview>,
}

impl PostData {
    /// URL of the first preview image's source, if present.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview
            .as_ref()?
            .images
            .first()?
            .source
            .as_ref()?
            .url
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub images: Vec<PreviewImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewImage {
    pub source: Option<ImageSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSource {
    pub url: Option<String>,
}
