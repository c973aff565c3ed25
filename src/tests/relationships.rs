use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_create_and_join() {
    let mut app = helper::setup_test_app();

    let (alex, alex_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;
    let (sam, sam_token) = helper::register_and_login(&mut app, "sam@example.com", "Sam").await;

    // nothing yet
    let (status_code, relationship) = helper::my_relationship(&mut app, &alex_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(relationship.unwrap().is_none());

    // create relationship
    let (status_code, relationship, _) =
        helper::maybe_create_relationship(&mut app, &alex_token).await;
    assert_eq!(StatusCode::CREATED, status_code);
    let relationship = relationship.unwrap();
    assert_eq!(8, relationship.invite_code.len());
    assert_eq!(1, relationship.members.len());
    assert_eq!(alex.id, relationship.members[0].user_id);
    assert_eq!("owner".to_string(), relationship.members[0].role);
    assert_eq!("active".to_string(), relationship.members[0].status);

    // a second relationship is not allowed
    let (status_code, _, message) = helper::maybe_create_relationship(&mut app, &alex_token).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Already in a relationship".to_string()), message);

    // join with a lowercase invite code
    let (status_code, joined, _) = helper::maybe_join(
        &mut app,
        &sam_token,
        &format!(" {} ", relationship.invite_code.to_lowercase()),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);
    let joined = joined.unwrap();
    assert_eq!(relationship.id, joined.id);
    assert_eq!(2, joined.members.len());
    assert_eq!(sam.id, joined.members[1].user_id);
    assert_eq!("member".to_string(), joined.members[1].role);
    assert_eq!("active".to_string(), joined.members[1].status);

    // joining twice
    let (status_code, _, message) =
        helper::maybe_join(&mut app, &sam_token, &relationship.invite_code).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Already in a relationship".to_string()), message);

    // both see the same relationship
    let (status_code, mine) = helper::my_relationship(&mut app, &sam_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(relationship.id, mine.unwrap().unwrap().id);
}

#[tokio::test]
async fn test_unknown_invite_code() {
    let mut app = helper::setup_test_app();

    let (_, access_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;

    let (status_code, _, message) = helper::maybe_join(&mut app, &access_token, "NOPENOPE").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Invite not found".to_string()), message);
}

#[tokio::test]
async fn test_invite() {
    let mut app = helper::setup_test_app();

    let (_, alex_token) = helper::register_and_login(&mut app, "alex@example.com", "Alex").await;
    let (sam, sam_token) = helper::register_and_login(&mut app, "sam@example.com", "Sam").await;

    // no relationship to invite to
    let (status_code, _, message) =
        helper::maybe_invite(&mut app, &alex_token, "sam@example.com").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Only the owner can invite".to_string()), message);

    let (_, relationship, _) = helper::maybe_create_relationship(&mut app, &alex_token).await;
    let relationship = relationship.unwrap();

    // unknown user
    let (status_code, _, message) =
        helper::maybe_invite(&mut app, &alex_token, "nobody@example.com").await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("User not found".to_string()), message);

    // invite
    let (status_code, member, _) =
        helper::maybe_invite(&mut app, &alex_token, "Sam@Example.com").await;
    assert_eq!(StatusCode::CREATED, status_code);
    let member = member.unwrap();
    assert_eq!(sam.id, member.user_id);
    assert_eq!("pending".to_string(), member.status);

    // invite again
    let (status_code, _, message) =
        helper::maybe_invite(&mut app, &alex_token, "sam@example.com").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Already a member".to_string()), message);

    // the invite shows up for sam
    let (status_code, invites) = helper::list_invites(&mut app, &sam_token).await;
    assert_eq!(StatusCode::OK, status_code);
    let invites = invites.unwrap();
    assert_eq!(1, invites.len());
    assert_eq!(relationship.id, invites[0].id);

    // a pending member is not active yet
    let (status_code, mine) = helper::my_relationship(&mut app, &sam_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert!(mine.unwrap().is_none());

    // accepting turns the pending member active
    let (status_code, joined, _) =
        helper::maybe_join(&mut app, &sam_token, &relationship.invite_code).await;
    assert_eq!(StatusCode::OK, status_code);
    let joined = joined.unwrap();
    assert_eq!(2, joined.members.len());
    assert!(joined.members.iter().all(|member| member.status == "active"));

    // no more invites
    let (_, invites) = helper::list_invites(&mut app, &sam_token).await;
    assert!(invites.unwrap().is_empty());

    // only the owner can invite
    helper::register_and_login(&mut app, "kim@example.com", "Kim").await;
    let (status_code, _, message) =
        helper::maybe_invite(&mut app, &sam_token, "kim@example.com").await;
    assert_eq!(StatusCode::FORBIDDEN, status_code);
    assert_eq!(Some("Only the owner can invite".to_string()), message);
}
