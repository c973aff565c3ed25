//! Utility functions for the API

use uuid::Uuid;

use crate::api::Error;
use crate::coupons::Coupon;
use crate::pages::Page;
use crate::relationships::Member;
use crate::relationships::Relationship;
use crate::scrapbooks::Scrapbook;
use crate::storage::Storage;
use crate::users::User;

/// Maximum length of a title, after trimming
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum length of names, emails and identifiers in characters
pub const MAX_SHORT_TEXT_LENGTH: usize = 255;

/// Fetch the active membership of a user in a relationship
///
/// Users that are not an active member are not allowed in
pub async fn fetch_active_member<S: Storage>(
    storage: &S,
    relationship_id: &Uuid,
    user: &User,
) -> Result<Member, Error> {
    storage
        .find_single_member(relationship_id, &user.id)
        .await
        .map_err(Error::internal_server_error)?
        .filter(Member::is_active)
        .ok_or_else(|| Error::forbidden("Not a member of this relationship"))
}

/// Fetch a relationship the user is an active member of
pub async fn fetch_relationship<S: Storage>(
    storage: &S,
    relationship_id: &Uuid,
    user: &User,
) -> Result<Relationship, Error> {
    let relationship = storage
        .find_single_relationship_by_id(relationship_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Relationship not found"))?;

    fetch_active_member(storage, &relationship.id, user).await?;

    Ok(relationship)
}

/// Fetch the requested relationship, or the active relationship of the user when none is given
pub async fn resolve_relationship<S: Storage>(
    storage: &S,
    relationship_id: Option<&Uuid>,
    user: &User,
) -> Result<Relationship, Error> {
    match relationship_id {
        Some(relationship_id) => fetch_relationship(storage, relationship_id, user).await,
        None => storage
            .find_active_relationship_by_user(user)
            .await
            .map_err(Error::internal_server_error)?
            .ok_or_else(|| Error::not_found("Relationship not found")),
    }
}

/// Fetch a coupon of a relationship the user is an active member of
pub async fn fetch_coupon<S: Storage>(
    storage: &S,
    coupon_id: &Uuid,
    user: &User,
) -> Result<Coupon, Error> {
    let coupon = storage
        .find_single_coupon_by_id(coupon_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Coupon not found"))?;

    fetch_active_member(storage, &coupon.relationship_id, user).await?;

    Ok(coupon)
}

/// Fetch a scrapbook of a relationship the user is an active member of
pub async fn fetch_scrapbook<S: Storage>(
    storage: &S,
    scrapbook_id: &Uuid,
    user: &User,
) -> Result<Scrapbook, Error> {
    let scrapbook = storage
        .find_single_scrapbook_by_id(scrapbook_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Scrapbook not found"))?;

    fetch_active_member(storage, &scrapbook.relationship_id, user).await?;

    Ok(scrapbook)
}

/// Fetch a page of a scrapbook
pub async fn fetch_page<S: Storage>(
    storage: &S,
    scrapbook: &Scrapbook,
    page_id: &Uuid,
) -> Result<Page, Error> {
    storage
        .find_single_page_by_id(&scrapbook.id, page_id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Page not found"))
}

/// Fetch a scrapbook and one of its pages, for the user
pub async fn fetch_scrapbook_page<S: Storage>(
    storage: &S,
    scrapbook_id: &Uuid,
    page_id: &Uuid,
    user: &User,
) -> Result<(Scrapbook, Page), Error> {
    let scrapbook = fetch_scrapbook(storage, scrapbook_id, user).await?;
    let page = fetch_page(storage, &scrapbook, page_id).await?;

    Ok((scrapbook, page))
}

/// Validate a title, returns the trimmed title
pub fn parse_title(title: &str) -> Result<String, Error> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::bad_request("Title is required"));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::bad_request("Title is too long")
            .with_details(format!("at most {MAX_TITLE_LENGTH} characters")));
    }

    Ok(title.to_string())
}

/// Validate the content of a text box or note, `max_length` in characters
pub fn parse_text(text: &str, max_length: usize) -> Result<&str, Error> {
    if text.trim().is_empty() {
        return Err(Error::bad_request("Text is required"));
    }

    if text.chars().count() > max_length {
        return Err(Error::bad_request("Text is too long")
            .with_details(format!("at most {max_length} characters")));
    }

    Ok(text)
}

/// Validate a required single line value like a name, `field` names it in errors
pub fn parse_short_text<'a>(value: &'a str, field: &str) -> Result<&'a str, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::bad_request(format!("{field} is required")));
    }

    if value.chars().count() > MAX_SHORT_TEXT_LENGTH {
        return Err(Error::bad_request(format!("{field} is too long"))
            .with_details(format!("at most {MAX_SHORT_TEXT_LENGTH} characters")));
    }

    Ok(value)
}

/// Normalize optional free text, blank text is no text
pub fn parse_optional_text(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title() {
        assert_eq!("Summer".to_string(), parse_title("  Summer ").unwrap());
        assert!(parse_title("   ").is_err());
        assert!(parse_title(&"a".repeat(MAX_TITLE_LENGTH)).is_ok());
        assert!(parse_title(&"a".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!("Hello", parse_text("Hello", 5).unwrap());
        assert!(parse_text(" \n ", 5).is_err());
        assert!(parse_text("Hello!", 5).is_err());
    }

    #[test]
    fn test_parse_short_text() {
        assert_eq!("picnic", parse_short_text(" picnic ", "Template").unwrap());
        assert!(parse_short_text("  ", "Template").is_err());
        assert!(parse_short_text(&"é".repeat(MAX_SHORT_TEXT_LENGTH), "Template").is_ok());
        assert!(parse_short_text(&"a".repeat(MAX_SHORT_TEXT_LENGTH + 1), "Template").is_err());
    }

    #[test]
    fn test_parse_optional_text() {
        assert_eq!(None, parse_optional_text(None));
        assert_eq!(None, parse_optional_text(Some("  ".to_string())));
        assert_eq!(
            Some("Lovely".to_string()),
            parse_optional_text(Some(" Lovely ".to_string()))
        );
    }
}
