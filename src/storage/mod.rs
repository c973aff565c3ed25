//! All things related to the storage of users, relationships, coupons and scrapbooks

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::activity::ActivityKind;
use crate::coupons::Coupon;
use crate::pages::MediaKind;
use crate::pages::NoteColor;
use crate::pages::Page;
use crate::pages::PageElements;
use crate::pages::PageMedia;
use crate::pages::PageNote;
use crate::pages::PageSticker;
use crate::pages::PageText;
use crate::pages::StickerKind;
use crate::pages::TextFont;
use crate::pages::Transform;
use crate::push_tokens::Platform;
use crate::push_tokens::PushToken;
use crate::quests::ActivityCounts;
use crate::relationships::Member;
use crate::relationships::MemberRole;
use crate::relationships::MemberStatus;
use crate::relationships::Relationship;
use crate::scrapbooks::Cover;
use crate::scrapbooks::Details;
use crate::scrapbooks::Scrapbook;
use crate::users::User;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// The storage could not be prepared
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The normalized email
    pub email: &'a str,

    /// The display name
    pub display_name: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to change a password of a user
pub struct ChangePasswordValues<'a> {
    /// New session ID to invalidate current tokens
    pub session_id: &'a Uuid,

    /// The new hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Relationship
pub struct CreateRelationshipValues<'a> {
    /// The user creating the relationship, becomes the owner
    pub user: &'a User,

    /// The generated invite code
    pub invite_code: &'a str,
}

/// Values to add a Member to a relationship
pub struct CreateMemberValues<'a> {
    /// The user to add
    pub user: &'a User,

    /// Role of the new member
    pub role: MemberRole,

    /// Status of the new member
    pub status: MemberStatus,
}

/// Values to issue a Coupon
pub struct CreateCouponValues<'a> {
    pub relationship: &'a Relationship,
    pub issuer: &'a User,
    pub recipient_user_id: &'a Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub template_id: &'a str,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Values to create a Scrapbook
pub struct CreateScrapbookValues<'a> {
    pub relationship: &'a Relationship,
    pub user: &'a User,
    pub title: &'a str,
    pub cover: Option<&'a Cover>,
    pub details: &'a Details,
}

/// Values to update a Scrapbook
///
/// `None` leaves the field untouched
#[derive(Debug, Default)]
pub struct UpdateScrapbookValues {
    /// New title
    pub title: Option<String>,

    /// New cover, `Some(None)` removes the cover
    pub cover: Option<Option<Cover>>,
}

impl UpdateScrapbookValues {
    /// Merge the provided fields into an existing scrapbook
    pub fn merge(&self, scrapbook: &Scrapbook) -> Scrapbook {
        let mut merged = scrapbook.clone();

        if let Some(ref title) = self.title {
            merged.title.clone_from(title);
        }

        if let Some(ref cover) = self.cover {
            merged.cover.clone_from(cover);
        }

        merged
    }
}

/// Values to update the details of a scrapbook or page
///
/// `None` leaves the field untouched, `Some(None)` clears it
#[derive(Debug, Default)]
pub struct UpdateDetailsValues {
    pub date: Option<Option<NaiveDate>>,
    pub place: Option<Option<String>>,
    pub place_id: Option<Option<String>>,
    pub mood_tags: Option<Vec<String>>,
    pub review: Option<Option<String>>,
}

impl UpdateDetailsValues {
    /// Merge the provided fields into existing details
    pub fn merge(&self, details: &Details) -> Details {
        let mut merged = details.clone();

        if let Some(date) = self.date {
            merged.date = date;
        }

        if let Some(ref place) = self.place {
            merged.place.clone_from(place);
        }

        if let Some(ref place_id) = self.place_id {
            merged.place_id.clone_from(place_id);
        }

        if let Some(ref mood_tags) = self.mood_tags {
            merged.mood_tags.clone_from(mood_tags);
        }

        if let Some(ref review) = self.review {
            merged.review.clone_from(review);
        }

        merged
    }
}

/// Values to create a Page
pub struct CreatePageValues<'a> {
    pub details: &'a Details,
}

/// Values to update a transform, `None` leaves the field untouched
#[derive(Debug, Default)]
pub struct UpdateTransformValues {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    pub rotation: Option<f64>,
}

impl UpdateTransformValues {
    /// Merge the provided fields into an existing transform
    pub fn merge(&self, transform: &Transform) -> Transform {
        Transform {
            x: self.x.unwrap_or(transform.x),
            y: self.y.unwrap_or(transform.y),
            scale: self.scale.unwrap_or(transform.scale),
            rotation: self.rotation.unwrap_or(transform.rotation),
        }
    }
}

/// Values to place a photo on a page
pub struct CreateMediaValues<'a> {
    pub user: &'a User,
    pub kind: MediaKind,
    pub blob_key: &'a str,
    pub url: &'a str,
    pub width: i32,
    pub height: i32,
    pub transform: Transform,
}

/// Values to move a photo
#[derive(Debug, Default)]
pub struct UpdateMediaValues {
    pub transform: UpdateTransformValues,
}

impl UpdateMediaValues {
    /// Merge the provided fields into existing media
    pub fn merge(&self, media: &PageMedia) -> PageMedia {
        PageMedia {
            transform: self.transform.merge(&media.transform),
            ..media.clone()
        }
    }
}

/// Values to place a sticker on a page
pub struct CreateStickerValues<'a> {
    pub user: &'a User,
    pub kind: StickerKind,
    pub transform: Transform,
}

/// Values to change a sticker
#[derive(Debug, Default)]
pub struct UpdateStickerValues {
    pub kind: Option<StickerKind>,
    pub transform: UpdateTransformValues,
}

impl UpdateStickerValues {
    /// Merge the provided fields into an existing sticker
    pub fn merge(&self, sticker: &PageSticker) -> PageSticker {
        PageSticker {
            kind: self.kind.unwrap_or(sticker.kind),
            transform: self.transform.merge(&sticker.transform),
            ..sticker.clone()
        }
    }
}

/// Values to place a text on a page
pub struct CreateTextValues<'a> {
    pub user: &'a User,
    pub text: &'a str,
    pub font: TextFont,
    pub color: &'a str,
    pub transform: Transform,
}

/// Values to change a text
#[derive(Debug, Default)]
pub struct UpdateTextValues {
    pub text: Option<String>,
    pub font: Option<TextFont>,
    pub color: Option<String>,
    pub transform: UpdateTransformValues,
}

impl UpdateTextValues {
    /// Merge the provided fields into an existing text
    pub fn merge(&self, text: &PageText) -> PageText {
        let mut merged = PageText {
            font: self.font.unwrap_or(text.font),
            transform: self.transform.merge(&text.transform),
            ..text.clone()
        };

        if let Some(ref content) = self.text {
            merged.text.clone_from(content);
        }

        if let Some(ref color) = self.color {
            merged.color.clone_from(color);
        }

        merged
    }
}

/// Values to place a note on a page
pub struct CreateNoteValues<'a> {
    pub user: &'a User,
    pub text: &'a str,
    pub color: NoteColor,
    pub x: f64,
    pub y: f64,
}

/// Values to change a note
#[derive(Debug, Default)]
pub struct UpdateNoteValues {
    pub text: Option<String>,
    pub color: Option<NoteColor>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl UpdateNoteValues {
    /// Merge the provided fields into an existing note
    pub fn merge(&self, note: &PageNote) -> PageNote {
        let mut merged = PageNote {
            color: self.color.unwrap_or(note.color),
            x: self.x.unwrap_or(note.x),
            y: self.y.unwrap_or(note.y),
            ..note.clone()
        };

        if let Some(ref text) = self.text {
            merged.text.clone_from(text);
        }

        merged
    }
}

/// Values to register a push token
pub struct RegisterPushTokenValues<'a> {
    pub token: &'a str,
    pub platform: Platform,
}

/// Possible activity entry types
pub enum Activity<'a> {
    /// Relationship is created
    CreateRelationship(&'a Relationship),

    /// Member is invited
    InviteMember(&'a Relationship, &'a Member),

    /// Member joined
    JoinRelationship(&'a Relationship, &'a Member),

    /// Coupon is issued
    CreateCoupon(&'a Coupon),

    /// Coupon is redeemed
    RedeemCoupon(&'a Coupon),

    /// Coupon is deleted
    DeleteCoupon(&'a Coupon),

    /// Scrapbook is created
    CreateScrapbook(&'a Scrapbook),

    /// Scrapbook or its details are updated
    UpdateScrapbook(&'a Scrapbook),

    /// Scrapbook is deleted
    DeleteScrapbook(&'a Scrapbook),

    /// Page is created
    CreatePage(&'a Scrapbook, &'a Page),

    /// Page details are updated
    UpdatePage(&'a Scrapbook, &'a Page),

    /// Page is deleted
    DeletePage(&'a Scrapbook, &'a Page),

    /// Photo is placed
    CreateMedia(&'a Scrapbook, &'a PageMedia),

    /// Photo is moved
    UpdateMedia(&'a Scrapbook, &'a PageMedia),

    /// Photo is removed
    DeleteMedia(&'a Scrapbook, &'a PageMedia),

    /// Sticker is placed
    CreateSticker(&'a Scrapbook, &'a PageSticker),

    /// Sticker is changed
    UpdateSticker(&'a Scrapbook, &'a PageSticker),

    /// Sticker is removed
    DeleteSticker(&'a Scrapbook, &'a PageSticker),

    /// Text is placed
    CreateText(&'a Scrapbook, &'a PageText),

    /// Text is changed
    UpdateText(&'a Scrapbook, &'a PageText),

    /// Text is removed
    DeleteText(&'a Scrapbook, &'a PageText),

    /// Note is placed
    CreateNote(&'a Scrapbook, &'a PageNote),

    /// Note is changed
    UpdateNote(&'a Scrapbook, &'a PageNote),

    /// Note is removed
    DeleteNote(&'a Scrapbook, &'a PageNote),
}

impl Activity<'_> {
    /// The kind of activity
    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::CreateRelationship(_) => ActivityKind::CreateRelationship,
            Activity::InviteMember(..) => ActivityKind::InviteMember,
            Activity::JoinRelationship(..) => ActivityKind::JoinRelationship,

            Activity::CreateCoupon(_) => ActivityKind::CreateCoupon,
            Activity::RedeemCoupon(_) => ActivityKind::RedeemCoupon,
            Activity::DeleteCoupon(_) => ActivityKind::DeleteCoupon,

            Activity::CreateScrapbook(_) => ActivityKind::CreateScrapbook,
            Activity::UpdateScrapbook(_) => ActivityKind::UpdateScrapbook,
            Activity::DeleteScrapbook(_) => ActivityKind::DeleteScrapbook,

            Activity::CreatePage(..) => ActivityKind::CreatePage,
            Activity::UpdatePage(..) => ActivityKind::UpdatePage,
            Activity::DeletePage(..) => ActivityKind::DeletePage,

            Activity::CreateMedia(..) => ActivityKind::CreateMedia,
            Activity::UpdateMedia(..) => ActivityKind::UpdateMedia,
            Activity::DeleteMedia(..) => ActivityKind::DeleteMedia,

            Activity::CreateSticker(..) => ActivityKind::CreateSticker,
            Activity::UpdateSticker(..) => ActivityKind::UpdateSticker,
            Activity::DeleteSticker(..) => ActivityKind::DeleteSticker,

            Activity::CreateText(..) => ActivityKind::CreateText,
            Activity::UpdateText(..) => ActivityKind::UpdateText,
            Activity::DeleteText(..) => ActivityKind::DeleteText,

            Activity::CreateNote(..) => ActivityKind::CreateNote,
            Activity::UpdateNote(..) => ActivityKind::UpdateNote,
            Activity::DeleteNote(..) => ActivityKind::DeleteNote,
        }
    }

    /// The relationship the activity happened in
    pub fn relationship_id(&self) -> Uuid {
        match self {
            Activity::CreateRelationship(relationship)
            | Activity::InviteMember(relationship, _)
            | Activity::JoinRelationship(relationship, _) => relationship.id,

            Activity::CreateCoupon(coupon)
            | Activity::RedeemCoupon(coupon)
            | Activity::DeleteCoupon(coupon) => coupon.relationship_id,

            Activity::CreateScrapbook(scrapbook)
            | Activity::UpdateScrapbook(scrapbook)
            | Activity::DeleteScrapbook(scrapbook)
            | Activity::CreatePage(scrapbook, _)
            | Activity::UpdatePage(scrapbook, _)
            | Activity::DeletePage(scrapbook, _)
            | Activity::CreateMedia(scrapbook, _)
            | Activity::UpdateMedia(scrapbook, _)
            | Activity::DeleteMedia(scrapbook, _)
            | Activity::CreateSticker(scrapbook, _)
            | Activity::UpdateSticker(scrapbook, _)
            | Activity::DeleteSticker(scrapbook, _)
            | Activity::CreateText(scrapbook, _)
            | Activity::UpdateText(scrapbook, _)
            | Activity::DeleteText(scrapbook, _)
            | Activity::CreateNote(scrapbook, _)
            | Activity::UpdateNote(scrapbook, _)
            | Activity::DeleteNote(scrapbook, _) => scrapbook.relationship_id,
        }
    }

    /// The ID of the thing acted upon
    pub fn subject_id(&self) -> Uuid {
        match self {
            Activity::CreateRelationship(relationship) => relationship.id,
            Activity::InviteMember(_, member) | Activity::JoinRelationship(_, member) => {
                member.user_id
            }

            Activity::CreateCoupon(coupon)
            | Activity::RedeemCoupon(coupon)
            | Activity::DeleteCoupon(coupon) => coupon.id,

            Activity::CreateScrapbook(scrapbook)
            | Activity::UpdateScrapbook(scrapbook)
            | Activity::DeleteScrapbook(scrapbook) => scrapbook.id,

            Activity::CreatePage(_, page)
            | Activity::UpdatePage(_, page)
            | Activity::DeletePage(_, page) => page.id,

            Activity::CreateMedia(_, media)
            | Activity::UpdateMedia(_, media)
            | Activity::DeleteMedia(_, media) => media.id,

            Activity::CreateSticker(_, sticker)
            | Activity::UpdateSticker(_, sticker)
            | Activity::DeleteSticker(_, sticker) => sticker.id,

            Activity::CreateText(_, text)
            | Activity::UpdateText(_, text)
            | Activity::DeleteText(_, text) => text.id,

            Activity::CreateNote(_, note)
            | Activity::UpdateNote(_, note)
            | Activity::DeleteNote(_, note) => note.id,
        }
    }
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its normalized email
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User>;

    /// Change the password of a user
    async fn change_password(
        &self,
        user: &User,
        values: &ChangePasswordValues<'_>,
    ) -> Result<User>;

    /// Find the relationship the user is an active member of
    async fn find_active_relationship_by_user(&self, user: &User) -> Result<Option<Relationship>>;

    /// Find all relationships the user is invited to
    async fn find_pending_relationships_by_user(&self, user: &User) -> Result<Vec<Relationship>>;

    /// Find a single relationship by ID
    async fn find_single_relationship_by_id(&self, id: &Uuid) -> Result<Option<Relationship>>;

    /// Find a single relationship by its normalized invite code
    async fn find_single_relationship_by_invite_code(
        &self,
        invite_code: &str,
    ) -> Result<Option<Relationship>>;

    /// Find all members of a relationship, oldest first
    async fn find_all_members_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Member>>;

    /// Find a single member of a relationship
    async fn find_single_member(
        &self,
        relationship_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Member>>;

    /// Create a relationship with its creator as active owner
    async fn create_relationship(
        &self,
        values: &CreateRelationshipValues<'_>,
    ) -> Result<Relationship>;

    /// Add a member to a relationship
    async fn create_member(
        &self,
        relationship: &Relationship,
        values: &CreateMemberValues<'_>,
    ) -> Result<Member>;

    /// Turn a pending member into an active member
    async fn activate_member(&self, member: &Member) -> Result<Member>;

    /// Find all coupons of a relationship, newest first
    async fn find_all_coupons_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Coupon>>;

    /// Find a single coupon by ID
    async fn find_single_coupon_by_id(&self, id: &Uuid) -> Result<Option<Coupon>>;

    /// Issue a coupon
    async fn create_coupon(&self, values: &CreateCouponValues<'_>) -> Result<Coupon>;

    /// Mark a coupon as redeemed, if it is still active at `redeemed_at`
    ///
    /// Returns `None` when the coupon is gone, already redeemed or expired
    async fn redeem_coupon(
        &self,
        coupon: &Coupon,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>>;

    /// Delete a coupon
    async fn delete_coupon(&self, coupon: &Coupon) -> Result<()>;

    /// Mark all active coupons past their expiration date as expired
    ///
    /// Returns the number of expired coupons
    async fn expire_coupons(&self, now: DateTime<Utc>) -> Result<u64>;

    /// Find all scrapbooks of a relationship, newest first
    async fn find_all_scrapbooks_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Scrapbook>>;

    /// Find a single scrapbook by ID
    async fn find_single_scrapbook_by_id(&self, id: &Uuid) -> Result<Option<Scrapbook>>;

    /// Create a scrapbook
    async fn create_scrapbook(&self, values: &CreateScrapbookValues<'_>) -> Result<Scrapbook>;

    /// Update the title and cover of a scrapbook
    ///
    /// Returns `None` when the scrapbook was deleted in the meantime, as do the other updates
    async fn update_scrapbook(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateScrapbookValues,
    ) -> Result<Option<Scrapbook>>;

    /// Update the details of a scrapbook
    async fn update_scrapbook_details(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Scrapbook>>;

    /// Delete a scrapbook, its pages and their elements
    async fn delete_scrapbook(&self, scrapbook: &Scrapbook) -> Result<()>;

    /// Find all pages of a scrapbook, ordered by page index
    async fn find_all_pages_by_scrapbook(&self, scrapbook: &Scrapbook) -> Result<Vec<Page>>;

    /// Find a single page of a scrapbook
    async fn find_single_page_by_id(
        &self,
        scrapbook_id: &Uuid,
        page_id: &Uuid,
    ) -> Result<Option<Page>>;

    /// Append a page to a scrapbook
    async fn create_page(
        &self,
        scrapbook: &Scrapbook,
        values: &CreatePageValues<'_>,
    ) -> Result<Page>;

    /// Update the details of a page
    async fn update_page_details(
        &self,
        page: &Page,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Page>>;

    /// Delete a page and its elements, later pages shift down
    async fn delete_page(&self, page: &Page) -> Result<()>;

    /// Find all elements of a page, in creation order
    async fn find_page_elements(&self, page: &Page) -> Result<PageElements>;

    /// Find a single photo of a page
    async fn find_single_media(
        &self,
        page_id: &Uuid,
        media_id: &Uuid,
    ) -> Result<Option<PageMedia>>;

    /// Place a photo on a page
    async fn create_media(
        &self,
        page: &Page,
        values: &CreateMediaValues<'_>,
    ) -> Result<PageMedia>;

    /// Move a photo
    async fn update_media(
        &self,
        media: &PageMedia,
        values: &UpdateMediaValues,
    ) -> Result<Option<PageMedia>>;

    /// Remove a photo
    async fn delete_media(&self, media: &PageMedia) -> Result<()>;

    /// Find a single sticker of a page
    async fn find_single_sticker(
        &self,
        page_id: &Uuid,
        sticker_id: &Uuid,
    ) -> Result<Option<PageSticker>>;

    /// Place a sticker on a page
    async fn create_sticker(
        &self,
        page: &Page,
        values: &CreateStickerValues<'_>,
    ) -> Result<PageSticker>;

    /// Change a sticker
    async fn update_sticker(
        &self,
        sticker: &PageSticker,
        values: &UpdateStickerValues,
    ) -> Result<Option<PageSticker>>;

    /// Remove a sticker
    async fn delete_sticker(&self, sticker: &PageSticker) -> Result<()>;

    /// Find a single text of a page
    async fn find_single_text(&self, page_id: &Uuid, text_id: &Uuid) -> Result<Option<PageText>>;

    /// Place a text on a page
    async fn create_text(&self, page: &Page, values: &CreateTextValues<'_>) -> Result<PageText>;

    /// Change a text
    async fn update_text(
        &self,
        text: &PageText,
        values: &UpdateTextValues,
    ) -> Result<Option<PageText>>;

    /// Remove a text
    async fn delete_text(&self, text: &PageText) -> Result<()>;

    /// Find a single note of a page
    async fn find_single_note(&self, page_id: &Uuid, note_id: &Uuid) -> Result<Option<PageNote>>;

    /// Place a note on a page
    async fn create_note(&self, page: &Page, values: &CreateNoteValues<'_>) -> Result<PageNote>;

    /// Change a note
    async fn update_note(
        &self,
        note: &PageNote,
        values: &UpdateNoteValues,
    ) -> Result<Option<PageNote>>;

    /// Remove a note
    async fn delete_note(&self, note: &PageNote) -> Result<()>;

    /// Register a push token for a user
    ///
    /// A token registered to another user moves to this user
    async fn register_push_token(
        &self,
        user: &User,
        values: &RegisterPushTokenValues<'_>,
    ) -> Result<PushToken>;

    /// Remove a push token of a user
    ///
    /// Returns whether a token was removed
    async fn delete_push_token(&self, user: &User, token: &str) -> Result<bool>;

    /// Register an action on the activity log
    async fn register_activity(&self, user: &User, activity: &Activity<'_>) -> Result<()>;

    /// Count the activity of a relationship per kind since a moment in time
    async fn count_activity_since(
        &self,
        relationship_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<ActivityCounts>;
}
