//! Relationship API management
//!
//! A user is an active member of at most one relationship at a time

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;

use crate::password::generate_invite_code;
use crate::relationships::Member;
use crate::relationships::MemberRole;
use crate::relationships::MemberStatus;
use crate::relationships::Relationship;
use crate::relationships::normalize_invite_code;
use crate::storage::Activity;
use crate::storage::CreateMemberValues;
use crate::storage::CreateRelationshipValues;
use crate::storage::Storage;
use crate::users::normalize_email;

use super::ActivityLog;
use super::CurrentUser;
use super::Error;
use super::Form;
use super::Success;

/// Attempts to find an unused invite code
const INVITE_CODE_ATTEMPTS: usize = 5;

/// A relationship with all its members
#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
    #[serde(flatten)]
    relationship: Relationship,
    members: Vec<Member>,
}

/// Fetch the members of a relationship for the response
async fn with_members<S: Storage>(
    storage: &S,
    relationship: Relationship,
) -> Result<RelationshipResponse, Error> {
    let members = storage
        .find_all_members_by_relationship(&relationship)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(RelationshipResponse {
        relationship,
        members,
    })
}

/// Generate an invite code that is not in use yet
async fn unused_invite_code<S: Storage>(storage: &S) -> Result<String, Error> {
    for _ in 0..INVITE_CODE_ATTEMPTS {
        let invite_code = generate_invite_code().map_err(Error::internal_server_error)?;

        let existing = storage
            .find_single_relationship_by_invite_code(&invite_code)
            .await
            .map_err(Error::internal_server_error)?;

        if existing.is_none() {
            return Ok(invite_code);
        }
    }

    Err(Error::internal_server_error(
        "Could not generate an unused invite code",
    ))
}

/// Start a new relationship, the current user becomes its owner
///
/// Request:
/// ```sh
/// curl -v -XPOST -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/relationships
/// ```
///
/// Response
/// ```json
/// { "ok": true, "relationship": { "id": "<uuid>", "inviteCode": "AB3DKQ7Z", "members": [...] } }
/// ```
pub async fn create<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<RelationshipResponse>, Error> {
    let active = storage
        .find_active_relationship_by_user(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    if active.is_some() {
        return Err(Error::bad_request("Already in a relationship"));
    }

    let invite_code = unused_invite_code(&storage).await?;

    let values = CreateRelationshipValues {
        user: &current_user,
        invite_code: &invite_code,
    };

    let relationship = storage
        .create_relationship(&values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::CreateRelationship(&relationship))
        .await;

    Ok(Success::created(
        "relationship",
        with_members(&storage, relationship).await?,
    ))
}

/// Invite form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteForm {
    /// Email of the user to invite
    email: String,
}

/// Invite a registered user to the relationship of the current user
///
/// Only the owner can invite, the invited user becomes a pending member
pub async fn invite<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<InviteForm>,
) -> Result<Success<Member>, Error> {
    let relationship = storage
        .find_active_relationship_by_user(&current_user)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::forbidden("Only the owner can invite"))?;

    let owner = storage
        .find_single_member(&relationship.id, &current_user.id)
        .await
        .map_err(Error::internal_server_error)?;

    if !owner.is_some_and(|owner| owner.role == MemberRole::Owner) {
        return Err(Error::forbidden("Only the owner can invite"));
    }

    let invitee = storage
        .find_single_user_by_email(&normalize_email(&form.email))
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("User not found"))?;

    let existing = storage
        .find_single_member(&relationship.id, &invitee.id)
        .await
        .map_err(Error::internal_server_error)?;

    if existing.is_some() {
        return Err(Error::bad_request("Already a member"));
    }

    let active = storage
        .find_active_relationship_by_user(&invitee)
        .await
        .map_err(Error::internal_server_error)?;

    if active.is_some() {
        return Err(Error::bad_request("User is already in a relationship"));
    }

    let values = CreateMemberValues {
        user: &invitee,
        role: MemberRole::Member,
        status: MemberStatus::Pending,
    };

    let member = storage
        .create_member(&relationship, &values)
        .await
        .map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::InviteMember(&relationship, &member))
        .await;

    Ok(Success::created("member", member))
}

/// List the relationships the current user is invited to
pub async fn invites<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<RelationshipResponse>>, Error> {
    let relationships = storage
        .find_pending_relationships_by_user(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    let mut invites = Vec::with_capacity(relationships.len());
    for relationship in relationships {
        invites.push(with_members(&storage, relationship).await?);
    }

    Ok(Success::ok("invites", invites))
}

/// Join form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinForm {
    /// Invite code, case insensitive
    invite_code: String,
}

/// Join a relationship with its invite code
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "inviteCode": "ab3dkq7z" }' \
///     http://localhost:6000/api/relationships/join
/// ```
pub async fn join<S: Storage>(
    activity_log: ActivityLog<S>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<JoinForm>,
) -> Result<Success<RelationshipResponse>, Error> {
    let relationship = storage
        .find_single_relationship_by_invite_code(&normalize_invite_code(&form.invite_code))
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found("Invite not found"))?;

    let active = storage
        .find_active_relationship_by_user(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    if active.is_some() {
        return Err(Error::bad_request("Already in a relationship"));
    }

    let pending = storage
        .find_single_member(&relationship.id, &current_user.id)
        .await
        .map_err(Error::internal_server_error)?;

    let result = if let Some(pending) = pending {
        storage.activate_member(&pending).await
    } else {
        let values = CreateMemberValues {
            user: &current_user,
            role: MemberRole::Member,
            status: MemberStatus::Active,
        };

        storage.create_member(&relationship, &values).await
    };

    let member = result.map_err(Error::internal_server_error)?;

    activity_log
        .register(Activity::JoinRelationship(&relationship, &member))
        .await;

    Ok(Success::ok(
        "relationship",
        with_members(&storage, relationship).await?,
    ))
}

/// Get the active relationship of the current user, `null` when there is none
pub async fn mine<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Option<RelationshipResponse>>, Error> {
    let relationship = storage
        .find_active_relationship_by_user(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    let response = match relationship {
        Some(relationship) => Some(with_members(&storage, relationship).await?),
        None => None,
    };

    Ok(Success::ok("relationship", response))
}
