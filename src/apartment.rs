//! Apartment records and their locale-flattened view.
//!
//! [`localize`] resolves every multi-language field of an [`ApartmentRecord`]
//! for one locale and copies scalar fields unchanged. [`delocalize`] and
//! friends go the other way, from an editor's per-locale input back to
//! multi-language values.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{ContentError, Result};
use crate::i18n::{resolve_field, Locale, LocalizedText};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApartmentStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

/// An amenity, either `{code, name: {..}}` or a bare multi-language value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Amenity {
    pub code: Option<String>,
    pub name: LocalizedText,
}

impl From<Value> for Amenity {
    fn from(value: Value) -> Self {
        match value.get("name") {
            Some(name) => Amenity {
                code: value.get("code").and_then(Value::as_str).map(str::to_string),
                name: LocalizedText::from(name),
            },
            None => Amenity {
                code: None,
                name: LocalizedText::from(&value),
            },
        }
    }
}

/// An image with a localizable alt text. A bare URL string is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ApartmentImage {
    pub url: String,
    pub alt: LocalizedText,
}

impl From<Value> for ApartmentImage {
    fn from(value: Value) -> Self {
        match value {
            Value::String(url) => ApartmentImage {
                url,
                alt: LocalizedText::new(),
            },
            other => ApartmentImage {
                url: other
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                alt: other.get("alt").map(LocalizedText::from).unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub url: String,
    #[serde(default)]
    pub caption: LocalizedText,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalPrice {
    pub season: String,
    pub start_date: String,
    pub end_date: String,
    pub price_eur: f64,
}

/// An apartment as stored, multi-language fields unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentRecord {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub bed_type: LocalizedText,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default, deserialize_with = "lenient_list")]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub base_price_eur: f64,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<ApartmentImage>,
    #[serde(default)]
    pub status: ApartmentStatus,
    #[serde(default)]
    pub display_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub size_sqm: Option<f64>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub view_type: Option<LocalizedText>,
    #[serde(default)]
    pub bathroom_count: Option<i32>,
    #[serde(default)]
    pub balcony: Option<bool>,
    #[serde(default)]
    pub kitchen_type: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub features: Vec<LocalizedText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub house_rules: Vec<LocalizedText>,
    #[serde(default)]
    pub check_in_time: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<String>,
    #[serde(default)]
    pub min_stay_nights: Option<i32>,
    #[serde(default)]
    pub max_stay_nights: Option<i32>,
    #[serde(default)]
    pub cancellation_policy: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub gallery: Vec<GalleryItem>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub virtual_tour_url: Option<String>,
    #[serde(default)]
    pub meta_title: Option<LocalizedText>,
    #[serde(default)]
    pub meta_description: Option<LocalizedText>,
    #[serde(default)]
    pub meta_keywords: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub seasonal_pricing: Vec<SeasonalPrice>,
    #[serde(default)]
    pub weekend_price_eur: Option<f64>,
    #[serde(default)]
    pub weekly_discount_percent: Option<f64>,
    #[serde(default)]
    pub monthly_discount_percent: Option<f64>,

    #[serde(default)]
    pub bed_counts: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub selected_amenities: Option<Vec<String>>,
    #[serde(default)]
    pub selected_rules: Option<Vec<String>>,
    #[serde(default)]
    pub selected_view: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedImage {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedGalleryItem {
    pub url: String,
    pub caption: String,
    pub order: i32,
}

/// An apartment with every multi-language field resolved for one locale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedApartment {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub description: String,
    pub bed_type: String,
    pub capacity: i32,
    pub amenities: Vec<String>,
    pub base_price_eur: f64,
    pub images: Vec<LocalizedImage>,
    pub status: ApartmentStatus,
    pub display_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub size_sqm: Option<f64>,
    pub floor: Option<i32>,
    pub view_type: Option<String>,
    pub bathroom_count: Option<i32>,
    pub balcony: Option<bool>,
    pub kitchen_type: Option<String>,
    pub features: Vec<String>,
    pub house_rules: Vec<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub min_stay_nights: Option<i32>,
    pub max_stay_nights: Option<i32>,
    pub cancellation_policy: Option<String>,
    pub gallery: Vec<LocalizedGalleryItem>,
    pub video_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub seasonal_pricing: Vec<SeasonalPrice>,
    pub weekend_price_eur: Option<f64>,
    pub weekly_discount_percent: Option<f64>,
    pub monthly_discount_percent: Option<f64>,

    pub bed_counts: Option<BTreeMap<String, u32>>,
    pub selected_amenities: Option<Vec<String>>,
    pub selected_rules: Option<Vec<String>>,
    pub selected_view: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Resolve every multi-language field of `record` for `locale`.
pub fn localize(record: &ApartmentRecord, locale: Locale) -> LocalizedApartment {
    // Destructured exhaustively: a new record field must be handled here.
    let ApartmentRecord {
        id,
        slug,
        name,
        description,
        bed_type,
        capacity,
        amenities,
        base_price_eur,
        images,
        status,
        display_order,
        created_at,
        updated_at,
        size_sqm,
        floor,
        view_type,
        bathroom_count,
        balcony,
        kitchen_type,
        features,
        house_rules,
        check_in_time,
        check_out_time,
        min_stay_nights,
        max_stay_nights,
        cancellation_policy,
        gallery,
        video_url,
        virtual_tour_url,
        meta_title,
        meta_description,
        meta_keywords,
        seasonal_pricing,
        weekend_price_eur,
        weekly_discount_percent,
        monthly_discount_percent,
        bed_counts,
        selected_amenities,
        selected_rules,
        selected_view,
        address,
        city,
        country,
        postal_code,
        latitude,
        longitude,
    } = record;

    let optional = |field: &str, value: &Option<LocalizedText>| {
        value.as_ref().map(|text| resolve_field(field, text, locale))
    };
    let list = |field: &str, values: &[LocalizedText]| -> Vec<String> {
        values
            .iter()
            .map(|text| resolve_field(field, text, locale))
            .collect()
    };

    LocalizedApartment {
        id: id.clone(),
        slug: slug.clone(),
        name: resolve_field("name", name, locale),
        description: resolve_field("description", description, locale),
        bed_type: resolve_field("bed_type", bed_type, locale),
        capacity: *capacity,
        amenities: amenities
            .iter()
            .map(|amenity| resolve_field("amenities", &amenity.name, locale))
            .collect(),
        base_price_eur: *base_price_eur,
        images: images
            .iter()
            .map(|image| LocalizedImage {
                url: image.url.clone(),
                alt: resolve_field("images.alt", &image.alt, locale),
            })
            .collect(),
        status: *status,
        display_order: *display_order,
        created_at: *created_at,
        updated_at: *updated_at,

        size_sqm: *size_sqm,
        floor: *floor,
        view_type: optional("view_type", view_type),
        bathroom_count: *bathroom_count,
        balcony: *balcony,
        kitchen_type: optional("kitchen_type", kitchen_type),
        features: list("features", features.as_slice()),
        house_rules: list("house_rules", house_rules.as_slice()),
        check_in_time: check_in_time.clone(),
        check_out_time: check_out_time.clone(),
        min_stay_nights: *min_stay_nights,
        max_stay_nights: *max_stay_nights,
        cancellation_policy: optional("cancellation_policy", cancellation_policy),
        gallery: gallery
            .iter()
            .map(|item| LocalizedGalleryItem {
                url: item.url.clone(),
                caption: resolve_field("gallery.caption", &item.caption, locale),
                order: item.order,
            })
            .collect(),
        video_url: video_url.clone(),
        virtual_tour_url: virtual_tour_url.clone(),
        meta_title: optional("meta_title", meta_title),
        meta_description: optional("meta_description", meta_description),
        meta_keywords: optional("meta_keywords", meta_keywords),
        seasonal_pricing: seasonal_pricing.clone(),
        weekend_price_eur: *weekend_price_eur,
        weekly_discount_percent: *weekly_discount_percent,
        monthly_discount_percent: *monthly_discount_percent,

        bed_counts: bed_counts.clone(),
        selected_amenities: selected_amenities.clone(),
        selected_rules: selected_rules.clone(),
        selected_view: selected_view.clone(),

        address: address.clone(),
        city: city.clone(),
        country: country.clone(),
        postal_code: postal_code.clone(),
        latitude: *latitude,
        longitude: *longitude,
    }
}

pub fn localize_all(records: &[ApartmentRecord], locale: Locale) -> Vec<LocalizedApartment> {
    records.iter().map(|record| localize(record, locale)).collect()
}

// ==================== Editor Input ====================

/// Build a multi-language value from an editor's per-locale input.
///
/// Values are taken as-is; sanitization happens at the write gate.
pub fn delocalize(input: &BTreeMap<Locale, String>) -> LocalizedText {
    input
        .iter()
        .map(|(locale, value)| (*locale, value.clone()))
        .collect()
}

/// Build a list of multi-language values from per-locale lists.
///
/// Entry `i` collects the `i`-th item of every locale; a locale whose list is
/// shorter simply has no translation for the trailing entries.
pub fn delocalize_list(input: &BTreeMap<Locale, Vec<String>>) -> Vec<LocalizedText> {
    let len = input.values().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|i| {
            input
                .iter()
                .filter_map(|(locale, items)| items.get(i).map(|item| (*locale, item.clone())))
                .collect()
        })
        .collect()
}

/// Multi-language text fields an editor patch may target.
pub const TEXT_FIELDS: [&str; 9] = [
    "name",
    "description",
    "bed_type",
    "view_type",
    "kitchen_type",
    "cancellation_policy",
    "meta_title",
    "meta_description",
    "meta_keywords",
];

/// Turn per-field, per-locale editor input into a patch of multi-language values.
pub fn delocalize_form(
    form: &BTreeMap<String, BTreeMap<Locale, String>>,
) -> BTreeMap<String, LocalizedText> {
    form.iter()
        .map(|(field, input)| (field.clone(), delocalize(input)))
        .collect()
}

impl ApartmentRecord {
    /// Merge a patch produced by [`delocalize_form`] into this record.
    ///
    /// Locales present in the patch overwrite, others are kept. Unknown field
    /// names are rejected before anything is applied.
    pub fn apply_text_patch(&mut self, patch: &BTreeMap<String, LocalizedText>) -> Result<()> {
        let unknown: Vec<String> = patch
            .keys()
            .filter(|field| !TEXT_FIELDS.contains(&field.as_str()))
            .map(|field| format!("Unknown localizable field \"{}\"", field))
            .collect();
        if !unknown.is_empty() {
            return Err(ContentError::Validation(unknown));
        }

        for (field, update) in patch {
            let merge_optional = |slot: &mut Option<LocalizedText>| {
                let merged = slot.clone().unwrap_or_default().merge(update);
                *slot = Some(merged);
            };

            match field.as_str() {
                "name" => self.name = self.name.merge(update),
                "description" => self.description = self.description.merge(update),
                "bed_type" => self.bed_type = self.bed_type.merge(update),
                "view_type" => merge_optional(&mut self.view_type),
                "kitchen_type" => merge_optional(&mut self.kitchen_type),
                "cancellation_policy" => merge_optional(&mut self.cancellation_policy),
                "meta_title" => merge_optional(&mut self.meta_title),
                "meta_description" => merge_optional(&mut self.meta_description),
                "meta_keywords" => merge_optional(&mut self.meta_keywords),
                _ => {}
            }
        }

        Ok(())
    }
}

/// Deserialize a list field, treating `null` or a non-array as empty and
/// skipping elements that do not parse.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed list entry: {}", e);
                None
            }
        })
        .collect())
}
