//! Details forms, shared by scrapbooks and pages

use chrono::NaiveDate;
use serde::Deserialize;

use crate::scrapbooks::Details;
use crate::scrapbooks::MAX_MOOD_TAGS;
use crate::scrapbooks::normalize_mood_tags;
use crate::storage::UpdateDetailsValues;

use super::Error;
use super::Patch;
use super::utils::parse_optional_text;

fn parse_mood_tags(mood_tags: &[String]) -> Result<Vec<String>, Error> {
    normalize_mood_tags(mood_tags).ok_or_else(|| {
        Error::bad_request("Too many mood tags")
            .with_details(format!("at most {MAX_MOOD_TAGS} mood tags"))
    })
}

/// Details provided on creation
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsForm {
    date: Option<NaiveDate>,
    place: Option<String>,
    place_id: Option<String>,
    mood_tags: Option<Vec<String>>,
    review: Option<String>,
}

impl DetailsForm {
    /// Validate into details
    pub fn into_details(self) -> Result<Details, Error> {
        let mood_tags = match self.mood_tags {
            Some(mood_tags) => parse_mood_tags(&mood_tags)?,
            None => Vec::new(),
        };

        Ok(Details {
            date: self.date,
            place: parse_optional_text(self.place),
            place_id: parse_optional_text(self.place_id),
            mood_tags,
            review: parse_optional_text(self.review),
        })
    }
}

/// Details to change, see [`Patch`] for the meaning of each field
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetailsForm {
    #[serde(default)]
    date: Patch<NaiveDate>,
    #[serde(default)]
    place: Patch<String>,
    #[serde(default)]
    place_id: Patch<String>,
    #[serde(default)]
    mood_tags: Patch<Vec<String>>,
    #[serde(default)]
    review: Patch<String>,
}

impl UpdateDetailsForm {
    /// Validate into update values
    ///
    /// Blank text clears a field, `null` mood tags clear all tags
    pub fn into_values(self) -> Result<UpdateDetailsValues, Error> {
        let mood_tags = match self.mood_tags {
            Patch::Missing => None,
            Patch::Null => Some(Vec::new()),
            Patch::Value(mood_tags) => Some(parse_mood_tags(&mood_tags)?),
        };

        Ok(UpdateDetailsValues {
            date: self.date.nullable(),
            place: self.place.nullable().map(parse_optional_text),
            place_id: self
                .place_id
                .nullable()
                .map(parse_optional_text),
            mood_tags,
            review: self.review.nullable().map(parse_optional_text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(json: &str) -> UpdateDetailsValues {
        serde_json::from_str::<UpdateDetailsForm>(json)
            .unwrap()
            .into_values()
            .unwrap()
    }

    #[test]
    fn test_update_details_form() {
        let values = values(r#"{"place":null,"review":"  Lovely ","moodTags":null}"#);

        assert_eq!(None, values.date);
        assert_eq!(Some(None), values.place);
        assert_eq!(None, values.place_id);
        assert_eq!(Some(Some("Lovely".to_string())), values.review);
        assert_eq!(Some(Vec::new()), values.mood_tags);
    }

    #[test]
    fn test_update_details_form_date() {
        let values = values(r#"{"date":"2026-02-14"}"#);

        assert_eq!(Some(NaiveDate::from_ymd_opt(2026, 2, 14)), values.date);
    }

    #[test]
    fn test_details_form_too_many_mood_tags() {
        let form = DetailsForm {
            mood_tags: Some((0..=MAX_MOOD_TAGS).map(|i| format!("tag-{i}")).collect()),
            ..Default::default()
        };

        assert!(form.into_details().is_err());
    }
}
