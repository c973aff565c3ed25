//! Memory storage
//!
//! Will be destroyed on system shutdown. Tables are kept in insertion order, which doubles as the
//! creation order of their rows.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::activity::ActivityKind;
use crate::coupons::Coupon;
use crate::coupons::CouponStatus;
use crate::pages::Page;
use crate::pages::PageElements;
use crate::pages::PageMedia;
use crate::pages::PageNote;
use crate::pages::PageSticker;
use crate::pages::PageText;
use crate::push_tokens::PushToken;
use crate::quests::ActivityCounts;
use crate::relationships::Member;
use crate::relationships::MemberRole;
use crate::relationships::MemberStatus;
use crate::relationships::Relationship;
use crate::scrapbooks::Scrapbook;
use crate::users::User;

use super::Activity;
use super::ChangePasswordValues;
use super::CreateCouponValues;
use super::CreateMediaValues;
use super::CreateMemberValues;
use super::CreateNoteValues;
use super::CreatePageValues;
use super::CreateRelationshipValues;
use super::CreateScrapbookValues;
use super::CreateStickerValues;
use super::CreateTextValues;
use super::CreateUserValues;
use super::RegisterPushTokenValues;
use super::Result;
use super::Storage;
use super::UpdateDetailsValues;
use super::UpdateMediaValues;
use super::UpdateNoteValues;
use super::UpdateScrapbookValues;
use super::UpdateStickerValues;
use super::UpdateTextValues;

/// A recorded activity
#[derive(Clone, Debug)]
struct ActivityEntry {
    relationship_id: Uuid,
    kind: ActivityKind,
    created_at: DateTime<Utc>,
}

/// A single in-memory table
type Table<T> = Arc<Mutex<Vec<T>>>;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    users: Table<User>,
    relationships: Table<Relationship>,
    members: Table<Member>,
    coupons: Table<Coupon>,
    scrapbooks: Table<Scrapbook>,
    pages: Table<Page>,
    media: Table<PageMedia>,
    stickers: Table<PageSticker>,
    texts: Table<PageText>,
    notes: Table<PageNote>,
    push_tokens: Table<PushToken>,
    activity: Table<ActivityEntry>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all elements of the given pages
    async fn delete_elements_of_pages(&self, page_ids: &[Uuid]) {
        let on_pages = |page_id: &Uuid| page_ids.contains(page_id);

        self.media
            .lock()
            .await
            .retain(|media| !on_pages(&media.page_id));
        self.stickers
            .lock()
            .await
            .retain(|sticker| !on_pages(&sticker.page_id));
        self.texts
            .lock()
            .await
            .retain(|text| !on_pages(&text.page_id));
        self.notes
            .lock()
            .await
            .retain(|note| !on_pages(&note.page_id));
    }
}

/// Replace a row in a table by ID and return the stored row, if it still exists
async fn replace<T, F>(table: &Table<T>, row: T, same: F) -> Option<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut rows = table.lock().await;

    let existing = rows.iter_mut().find(|existing| same(existing, &row))?;
    *existing = row.clone();

    Some(row)
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| &user.id == id)
            .cloned())
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            email: values.email.to_string(),
            display_name: values.display_name.to_string(),
            hashed_password: values.hashed_password.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.users.lock().await.push(user.clone());

        Ok(user)
    }

    async fn change_password(
        &self,
        user: &User,
        values: &ChangePasswordValues<'_>,
    ) -> Result<User> {
        let updated = User {
            session_id: *values.session_id,
            hashed_password: values.hashed_password.to_string(),
            updated_at: Utc::now(),
            ..user.clone()
        };

        replace(&self.users, updated, |a, b| a.id == b.id)
            .await
            .ok_or_else(|| super::Error::Connection("User disappeared".to_string()))
    }

    async fn find_active_relationship_by_user(&self, user: &User) -> Result<Option<Relationship>> {
        let relationship_id = self
            .members
            .lock()
            .await
            .iter()
            .find(|member| member.user_id == user.id && member.is_active())
            .map(|member| member.relationship_id);

        match relationship_id {
            Some(relationship_id) => self.find_single_relationship_by_id(&relationship_id).await,
            None => Ok(None),
        }
    }

    async fn find_pending_relationships_by_user(&self, user: &User) -> Result<Vec<Relationship>> {
        let relationship_ids = self
            .members
            .lock()
            .await
            .iter()
            .filter(|member| member.user_id == user.id && !member.is_active())
            .map(|member| member.relationship_id)
            .collect::<Vec<Uuid>>();

        Ok(self
            .relationships
            .lock()
            .await
            .iter()
            .filter(|relationship| relationship_ids.contains(&relationship.id))
            .cloned()
            .collect())
    }

    async fn find_single_relationship_by_id(&self, id: &Uuid) -> Result<Option<Relationship>> {
        Ok(self
            .relationships
            .lock()
            .await
            .iter()
            .find(|relationship| &relationship.id == id)
            .cloned())
    }

    async fn find_single_relationship_by_invite_code(
        &self,
        invite_code: &str,
    ) -> Result<Option<Relationship>> {
        Ok(self
            .relationships
            .lock()
            .await
            .iter()
            .find(|relationship| relationship.invite_code == invite_code)
            .cloned())
    }

    async fn find_all_members_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Member>> {
        Ok(self
            .members
            .lock()
            .await
            .iter()
            .filter(|member| member.relationship_id == relationship.id)
            .cloned()
            .collect())
    }

    async fn find_single_member(
        &self,
        relationship_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<Member>> {
        Ok(self
            .members
            .lock()
            .await
            .iter()
            .find(|member| &member.relationship_id == relationship_id && &member.user_id == user_id)
            .cloned())
    }

    async fn create_relationship(
        &self,
        values: &CreateRelationshipValues<'_>,
    ) -> Result<Relationship> {
        let now = Utc::now();

        let relationship = Relationship {
            id: Uuid::new_v4(),
            invite_code: values.invite_code.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.relationships.lock().await.push(relationship.clone());

        let owner = CreateMemberValues {
            user: values.user,
            role: MemberRole::Owner,
            status: MemberStatus::Active,
        };

        self.create_member(&relationship, &owner).await?;

        Ok(relationship)
    }

    async fn create_member(
        &self,
        relationship: &Relationship,
        values: &CreateMemberValues<'_>,
    ) -> Result<Member> {
        let now = Utc::now();

        let member = Member {
            relationship_id: relationship.id,
            user_id: values.user.id,
            email: values.user.email.clone(),
            display_name: values.user.display_name.clone(),
            role: values.role,
            status: values.status,
            created_at: now,
            updated_at: now,
        };

        self.members.lock().await.push(member.clone());

        Ok(member)
    }

    async fn activate_member(&self, member: &Member) -> Result<Member> {
        let activated = Member {
            status: MemberStatus::Active,
            updated_at: Utc::now(),
            ..member.clone()
        };

        replace(&self.members, activated, |a, b| {
            a.relationship_id == b.relationship_id && a.user_id == b.user_id
        })
        .await
        .ok_or_else(|| super::Error::Connection("Member disappeared".to_string()))
    }

    async fn find_all_coupons_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Coupon>> {
        Ok(self
            .coupons
            .lock()
            .await
            .iter()
            .rev()
            .filter(|coupon| coupon.relationship_id == relationship.id)
            .cloned()
            .collect())
    }

    async fn find_single_coupon_by_id(&self, id: &Uuid) -> Result<Option<Coupon>> {
        Ok(self
            .coupons
            .lock()
            .await
            .iter()
            .find(|coupon| &coupon.id == id)
            .cloned())
    }

    async fn create_coupon(&self, values: &CreateCouponValues<'_>) -> Result<Coupon> {
        let now = Utc::now();

        let coupon = Coupon {
            id: Uuid::new_v4(),
            relationship_id: values.relationship.id,
            issuer_user_id: values.issuer.id,
            recipient_user_id: *values.recipient_user_id,
            title: values.title.to_string(),
            description: values.description.map(ToString::to_string),
            template_id: values.template_id.to_string(),
            status: CouponStatus::Active,
            expires_at: values.expires_at,
            redeemed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.coupons.lock().await.push(coupon.clone());

        Ok(coupon)
    }

    async fn redeem_coupon(
        &self,
        coupon: &Coupon,
        redeemed_at: DateTime<Utc>,
    ) -> Result<Option<Coupon>> {
        let mut coupons = self.coupons.lock().await;

        let Some(existing) = coupons.iter_mut().find(|existing| existing.id == coupon.id) else {
            return Ok(None);
        };

        if existing.status_at(redeemed_at) != CouponStatus::Active {
            return Ok(None);
        }

        existing.status = CouponStatus::Redeemed;
        existing.redeemed_at = Some(redeemed_at);
        existing.updated_at = redeemed_at;

        Ok(Some(existing.clone()))
    }

    async fn delete_coupon(&self, coupon: &Coupon) -> Result<()> {
        self.coupons
            .lock()
            .await
            .retain(|existing| existing.id != coupon.id);

        Ok(())
    }

    async fn expire_coupons(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut expired = 0;

        for coupon in self.coupons.lock().await.iter_mut() {
            if coupon.status == CouponStatus::Active && coupon.is_past_expiry(now) {
                coupon.status = CouponStatus::Expired;
                coupon.updated_at = now;
                expired += 1;
            }
        }

        Ok(expired)
    }

    async fn find_all_scrapbooks_by_relationship(
        &self,
        relationship: &Relationship,
    ) -> Result<Vec<Scrapbook>> {
        Ok(self
            .scrapbooks
            .lock()
            .await
            .iter()
            .rev()
            .filter(|scrapbook| scrapbook.relationship_id == relationship.id)
            .cloned()
            .collect())
    }

    async fn find_single_scrapbook_by_id(&self, id: &Uuid) -> Result<Option<Scrapbook>> {
        Ok(self
            .scrapbooks
            .lock()
            .await
            .iter()
            .find(|scrapbook| &scrapbook.id == id)
            .cloned())
    }

    async fn create_scrapbook(&self, values: &CreateScrapbookValues<'_>) -> Result<Scrapbook> {
        let now = Utc::now();

        let scrapbook = Scrapbook {
            id: Uuid::new_v4(),
            relationship_id: values.relationship.id,
            created_by_user_id: values.user.id,
            title: values.title.to_string(),
            cover: values.cover.cloned(),
            details: values.details.clone(),
            created_at: now,
            updated_at: now,
        };

        self.scrapbooks.lock().await.push(scrapbook.clone());

        Ok(scrapbook)
    }

    async fn update_scrapbook(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateScrapbookValues,
    ) -> Result<Option<Scrapbook>> {
        let updated = Scrapbook {
            updated_at: Utc::now(),
            ..values.merge(scrapbook)
        };

        Ok(replace(&self.scrapbooks, updated, |a, b| a.id == b.id).await)
    }

    async fn update_scrapbook_details(
        &self,
        scrapbook: &Scrapbook,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Scrapbook>> {
        let updated = Scrapbook {
            details: values.merge(&scrapbook.details),
            updated_at: Utc::now(),
            ..scrapbook.clone()
        };

        Ok(replace(&self.scrapbooks, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_scrapbook(&self, scrapbook: &Scrapbook) -> Result<()> {
        // held until the scrapbook is gone, new pages wait for it
        let mut pages = self.pages.lock().await;

        let page_ids = pages
            .iter()
            .filter(|page| page.scrapbook_id == scrapbook.id)
            .map(|page| page.id)
            .collect::<Vec<Uuid>>();

        pages.retain(|page| page.scrapbook_id != scrapbook.id);

        self.delete_elements_of_pages(&page_ids).await;

        self.scrapbooks
            .lock()
            .await
            .retain(|existing| existing.id != scrapbook.id);

        Ok(())
    }

    async fn find_all_pages_by_scrapbook(&self, scrapbook: &Scrapbook) -> Result<Vec<Page>> {
        let mut pages = self
            .pages
            .lock()
            .await
            .iter()
            .filter(|page| page.scrapbook_id == scrapbook.id)
            .cloned()
            .collect::<Vec<Page>>();

        pages.sort_by_key(|page| page.page_index);

        Ok(pages)
    }

    async fn find_single_page_by_id(
        &self,
        scrapbook_id: &Uuid,
        page_id: &Uuid,
    ) -> Result<Option<Page>> {
        Ok(self
            .pages
            .lock()
            .await
            .iter()
            .find(|page| &page.scrapbook_id == scrapbook_id && &page.id == page_id)
            .cloned())
    }

    async fn create_page(
        &self,
        scrapbook: &Scrapbook,
        values: &CreatePageValues<'_>,
    ) -> Result<Page> {
        let now = Utc::now();
        let mut pages = self.pages.lock().await;

        if !self
            .scrapbooks
            .lock()
            .await
            .iter()
            .any(|existing| existing.id == scrapbook.id)
        {
            return Err(super::Error::Connection("Scrapbook disappeared".to_string()));
        }

        let page_count = pages
            .iter()
            .filter(|page| page.scrapbook_id == scrapbook.id)
            .count();

        let page = Page {
            id: Uuid::new_v4(),
            scrapbook_id: scrapbook.id,
            page_index: i32::try_from(page_count)
                .map_err(|err| super::Error::Connection(err.to_string()))?,
            details: values.details.clone(),
            created_at: now,
            updated_at: now,
        };

        pages.push(page.clone());

        Ok(page)
    }

    async fn update_page_details(
        &self,
        page: &Page,
        values: &UpdateDetailsValues,
    ) -> Result<Option<Page>> {
        let updated = Page {
            details: values.merge(&page.details),
            updated_at: Utc::now(),
            ..page.clone()
        };

        Ok(replace(&self.pages, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_page(&self, page: &Page) -> Result<()> {
        let mut pages = self.pages.lock().await;

        let Some(position) = pages.iter().position(|existing| existing.id == page.id) else {
            return Ok(());
        };

        // shift by the stored index
        let deleted = pages.remove(position);

        for later in pages.iter_mut().filter(|existing| {
            existing.scrapbook_id == deleted.scrapbook_id
                && existing.page_index > deleted.page_index
        }) {
            later.page_index -= 1;
        }

        self.delete_elements_of_pages(&[deleted.id]).await;

        Ok(())
    }

    async fn find_page_elements(&self, page: &Page) -> Result<PageElements> {
        Ok(PageElements {
            media: self
                .media
                .lock()
                .await
                .iter()
                .filter(|media| media.page_id == page.id)
                .cloned()
                .collect(),
            stickers: self
                .stickers
                .lock()
                .await
                .iter()
                .filter(|sticker| sticker.page_id == page.id)
                .cloned()
                .collect(),
            texts: self
                .texts
                .lock()
                .await
                .iter()
                .filter(|text| text.page_id == page.id)
                .cloned()
                .collect(),
            notes: self
                .notes
                .lock()
                .await
                .iter()
                .filter(|note| note.page_id == page.id)
                .cloned()
                .collect(),
        })
    }

    async fn find_single_media(
        &self,
        page_id: &Uuid,
        media_id: &Uuid,
    ) -> Result<Option<PageMedia>> {
        Ok(self
            .media
            .lock()
            .await
            .iter()
            .find(|media| &media.page_id == page_id && &media.id == media_id)
            .cloned())
    }

    async fn create_media(
        &self,
        page: &Page,
        values: &CreateMediaValues<'_>,
    ) -> Result<PageMedia> {
        let now = Utc::now();

        let media = PageMedia {
            id: Uuid::new_v4(),
            page_id: page.id,
            kind: values.kind,
            blob_key: values.blob_key.to_string(),
            url: values.url.to_string(),
            width: values.width,
            height: values.height,
            transform: values.transform,
            created_by_user_id: values.user.id,
            created_at: now,
            updated_at: now,
        };

        self.media.lock().await.push(media.clone());

        Ok(media)
    }

    async fn update_media(
        &self,
        media: &PageMedia,
        values: &UpdateMediaValues,
    ) -> Result<Option<PageMedia>> {
        let updated = PageMedia {
            updated_at: Utc::now(),
            ..values.merge(media)
        };

        Ok(replace(&self.media, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_media(&self, media: &PageMedia) -> Result<()> {
        self.media
            .lock()
            .await
            .retain(|existing| existing.id != media.id);

        Ok(())
    }

    async fn find_single_sticker(
        &self,
        page_id: &Uuid,
        sticker_id: &Uuid,
    ) -> Result<Option<PageSticker>> {
        Ok(self
            .stickers
            .lock()
            .await
            .iter()
            .find(|sticker| &sticker.page_id == page_id && &sticker.id == sticker_id)
            .cloned())
    }

    async fn create_sticker(
        &self,
        page: &Page,
        values: &CreateStickerValues<'_>,
    ) -> Result<PageSticker> {
        let now = Utc::now();

        let sticker = PageSticker {
            id: Uuid::new_v4(),
            page_id: page.id,
            kind: values.kind,
            transform: values.transform,
            created_by_user_id: values.user.id,
            created_at: now,
            updated_at: now,
        };

        self.stickers.lock().await.push(sticker.clone());

        Ok(sticker)
    }

    async fn update_sticker(
        &self,
        sticker: &PageSticker,
        values: &UpdateStickerValues,
    ) -> Result<Option<PageSticker>> {
        let updated = PageSticker {
            updated_at: Utc::now(),
            ..values.merge(sticker)
        };

        Ok(replace(&self.stickers, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_sticker(&self, sticker: &PageSticker) -> Result<()> {
        self.stickers
            .lock()
            .await
            .retain(|existing| existing.id != sticker.id);

        Ok(())
    }

    async fn find_single_text(&self, page_id: &Uuid, text_id: &Uuid) -> Result<Option<PageText>> {
        Ok(self
            .texts
            .lock()
            .await
            .iter()
            .find(|text| &text.page_id == page_id && &text.id == text_id)
            .cloned())
    }

    async fn create_text(&self, page: &Page, values: &CreateTextValues<'_>) -> Result<PageText> {
        let now = Utc::now();

        let text = PageText {
            id: Uuid::new_v4(),
            page_id: page.id,
            text: values.text.to_string(),
            font: values.font,
            color: values.color.to_string(),
            transform: values.transform,
            created_by_user_id: values.user.id,
            created_at: now,
            updated_at: now,
        };

        self.texts.lock().await.push(text.clone());

        Ok(text)
    }

    async fn update_text(
        &self,
        text: &PageText,
        values: &UpdateTextValues,
    ) -> Result<Option<PageText>> {
        let updated = PageText {
            updated_at: Utc::now(),
            ..values.merge(text)
        };

        Ok(replace(&self.texts, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_text(&self, text: &PageText) -> Result<()> {
        self.texts
            .lock()
            .await
            .retain(|existing| existing.id != text.id);

        Ok(())
    }

    async fn find_single_note(&self, page_id: &Uuid, note_id: &Uuid) -> Result<Option<PageNote>> {
        Ok(self
            .notes
            .lock()
            .await
            .iter()
            .find(|note| &note.page_id == page_id && &note.id == note_id)
            .cloned())
    }

    async fn create_note(&self, page: &Page, values: &CreateNoteValues<'_>) -> Result<PageNote> {
        let now = Utc::now();

        let note = PageNote {
            id: Uuid::new_v4(),
            page_id: page.id,
            text: values.text.to_string(),
            color: values.color,
            x: values.x,
            y: values.y,
            created_by_user_id: values.user.id,
            created_at: now,
            updated_at: now,
        };

        self.notes.lock().await.push(note.clone());

        Ok(note)
    }

    async fn update_note(
        &self,
        note: &PageNote,
        values: &UpdateNoteValues,
    ) -> Result<Option<PageNote>> {
        let updated = PageNote {
            updated_at: Utc::now(),
            ..values.merge(note)
        };

        Ok(replace(&self.notes, updated, |a, b| a.id == b.id).await)
    }

    async fn delete_note(&self, note: &PageNote) -> Result<()> {
        self.notes
            .lock()
            .await
            .retain(|existing| existing.id != note.id);

        Ok(())
    }

    async fn register_push_token(
        &self,
        user: &User,
        values: &RegisterPushTokenValues<'_>,
    ) -> Result<PushToken> {
        let now = Utc::now();
        let mut push_tokens = self.push_tokens.lock().await;

        if let Some(existing) = push_tokens
            .iter_mut()
            .find(|push_token| push_token.token == values.token)
        {
            existing.user_id = user.id;
            existing.platform = values.platform;
            existing.updated_at = now;

            return Ok(existing.clone());
        }

        let push_token = PushToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            token: values.token.to_string(),
            platform: values.platform,
            created_at: now,
            updated_at: now,
        };

        push_tokens.push(push_token.clone());

        Ok(push_token)
    }

    async fn delete_push_token(&self, user: &User, token: &str) -> Result<bool> {
        let mut push_tokens = self.push_tokens.lock().await;
        let before = push_tokens.len();

        push_tokens.retain(|push_token| !(push_token.user_id == user.id && push_token.token == token));

        Ok(push_tokens.len() != before)
    }

    async fn register_activity(&self, _user: &User, activity: &Activity<'_>) -> Result<()> {
        self.activity.lock().await.push(ActivityEntry {
            relationship_id: activity.relationship_id(),
            kind: activity.kind(),
            created_at: Utc::now(),
        });

        Ok(())
    }

    async fn count_activity_since(
        &self,
        relationship_id: &Uuid,
        since: DateTime<Utc>,
    ) -> Result<ActivityCounts> {
        let mut counts = HashMap::new();

        for entry in self.activity.lock().await.iter().filter(|entry| {
            &entry.relationship_id == relationship_id && entry.created_at >= since
        }) {
            *counts.entry(entry.kind).or_insert(0) += 1;
        }

        Ok(counts)
    }
}
